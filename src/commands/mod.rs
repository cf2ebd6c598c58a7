pub mod organize;
pub mod scan;
pub mod scanners;
