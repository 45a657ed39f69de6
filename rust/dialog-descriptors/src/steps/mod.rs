//! The classification steps run at every mention node.
//!
//! The recognizer applies them in a fixed order: partitive, appositive,
//! list, nested, pronoun, descriptor, nominal premodifier and, in a later
//! pass, subtype. Each step only touches mentions that earlier steps have
//! left untyped and passes everything else through unchanged, so a later
//! step never undoes an earlier structural decision.

mod appositive;
mod descriptor;
mod list;
mod nested;
mod none;
mod partitive;
mod premod;
mod pronoun;
mod subtype;

pub use appositive::AppositiveStep;
pub use descriptor::DescriptorStep;
pub use list::ListStep;
pub use nested::NestedStep;
pub use none::NoneStep;
pub use partitive::PartitiveStep;
pub use premod::PremodStep;
pub use pronoun::PronounStep;
pub use subtype::SubtypeStep;
