pub mod mace;
pub mod scenario;
pub mod simulate;
