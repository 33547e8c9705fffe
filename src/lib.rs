pub(crate) mod data {
    pub(crate) mod datasources {
        pub(crate) mod attribute_datasource;
        pub(crate) mod envelope_datasource;
        pub(crate) mod trust_verifier;
        pub(crate) mod utils;
    }
    pub(crate) mod models {
        pub(crate) mod receipt_attribute_model;
        pub(crate) mod validation_request_model;
    }
    pub(crate) mod repositories {
        pub(crate) mod receipt_repository_impl;
    }
}

pub mod domain {
    pub mod entities {
        pub mod date_triad;
        pub mod in_app;
        pub mod receipt;
        pub mod trust_anchor;
        pub mod validation_result;
    }
    pub mod repositories {
        pub mod receipt_repository;
    }
}

pub mod config;
pub mod date_codec;
pub mod errors;
pub mod util;
