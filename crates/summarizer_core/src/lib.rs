pub mod domain;
pub mod ports;

pub use domain::{
    Document, ExternalIdentity, FileUpload, NewDocument, RelayResponse, User, UserCredentials,
    PASTED_TEXT_FILENAME,
};
pub use ports::{
    DatabaseService, IdentityVerifier, PortError, PortResult, SummarizationService,
};
