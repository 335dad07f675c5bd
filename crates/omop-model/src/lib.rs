//! OMOP CDM 5.4 record model shared by the instrument ETL pipelines.

pub mod concepts;
pub mod enums;
pub mod ids;
pub mod interval;
pub mod records;
pub mod subject;

pub use enums::{Operator, SourceDataType, TargetDomain};
pub use ids::IdTracker;
pub use interval::Interval;
pub use records::{MeasurementRecord, ObservationRecord};
pub use subject::SubjectId;
