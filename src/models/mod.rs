pub use self::deprel::*;
pub use self::hmm::*;

mod deprel;
mod hmm;
