pub mod canonical;
pub mod metadata;
pub mod reference;
pub mod upstream;

pub use canonical::{CanonicalInvoice, CanonicalInvoiceLine, CanonicalPayment, CanonicalRecord};
pub use metadata::{FieldIssue, Metadata, OneOrMany, StoredConnection, UpdateMetadataBody};
pub use reference::{DetailEnvelope, Link, ListResponse, Reference};
pub use upstream::{NsInvoice, NsItem, NsPayment, NsRef, Numeric};
