pub mod export;
pub mod scaffold;
pub mod surface;
