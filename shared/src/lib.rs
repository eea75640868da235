// Shared library untuk semua BioPlast services

pub mod models {
    pub mod claims;
}

pub mod utils {
    pub mod jwt;
    pub mod validation;
}
