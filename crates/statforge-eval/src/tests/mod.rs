mod basic_formula;
mod kernel_reset;
mod long_chain;
mod remove_gated_by_formula_dependent;
mod self_reference;
