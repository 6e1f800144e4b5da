pub mod aligner_input;
pub mod alignment;
pub mod bitext;
pub mod conllu;
pub mod driver;
pub mod errors;
pub mod normalize;
pub mod projection;
pub mod reversal;
pub mod vocab;
