mod backend;

pub use backend::{
    Backend, BackendReply, CatalogEntry, HttpBackend, ListingRequest, PurchaseRequest,
};

pub(crate) use backend::lower_hex;
