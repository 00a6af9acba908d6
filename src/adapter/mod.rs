pub mod out_adapters {
    pub use super::output::*;
}

pub mod output;
