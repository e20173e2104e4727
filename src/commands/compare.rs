use modrepo_extract::models::VersionKey;
use std::cmp::Ordering;

pub fn symbol(a: &str, b: &str) -> char {
    match VersionKey::parse(a).cmp(&VersionKey::parse(b)) {
        Ordering::Less => '<',
        Ordering::Equal => '=',
        Ordering::Greater => '>',
    }
}

pub fn run(a: &str, b: &str) {
    println!("{a} {} {b}", symbol(a, b));
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.2", "1.10", '<')]
    #[case("1.0", "1.0.0", '<')]
    #[case("v1.0", "V1.0", '=')]
    #[case("2.0.0", "1.99.99", '>')]
    fn test_symbol(#[case] a: &str, #[case] b: &str, #[case] expected: char) {
        assert_eq!(symbol(a, b), expected);
    }
}
