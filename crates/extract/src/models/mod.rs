mod descriptor;
mod record;
mod version;

pub use self::descriptor::Descriptor;
pub use self::record::MetadataRecord;
pub use self::version::{Number, Part, Section, VersionKey};
