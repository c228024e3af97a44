pub mod actor;
pub mod control;
pub mod document;
pub mod framework;
pub mod mapping;

pub use actor::Actor;
pub use control::{ControlDeletion, ControlRecord, FrameworkControl};
pub use document::{parse_id_list, Document, DocumentException};
pub use framework::{Framework, FrameworkPatch, FrameworkStatus, NewFramework};
pub use mapping::{ControlMapping, MappedFramework, MappingEntry};
