//! The compiler pipeline: lex, shunt (shunting-yard), tree, simplify,
//! differentiate, approximate, format, and trace. Each stage is re-entrant
//! and takes the previous stage's owned output; none of them keep state
//! between calls (spec §5).

pub mod approximate;
pub mod differentiate;
pub mod format;
pub mod functions;
pub mod lex;
pub mod shunt;
pub mod simplify;
pub mod symbols;
pub mod syntax;
pub mod token;
pub mod trace;
pub mod tree;
