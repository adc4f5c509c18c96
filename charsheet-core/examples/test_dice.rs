//! Exercise dice formula parsing and evaluation

use charsheet_core::dice::{evaluate, Advantage, DiceFormula};

fn main() {
    println!("=== Dice Formulas ===\n");

    demo_roll("1d20", "Basic d20");
    demo_roll("2d6 + 3", "2d6 with modifier");
    demo_roll("1d20 + 2d4 - 1", "Mixed terms");
    demo_roll("8d6", "Fireball damage");
    demo_roll("garbage + 1d6", "Junk fragments are skipped");

    println!("\n=== Advantage and Disadvantage ===\n");

    demo_mode("1d20 + 5", Advantage::Advantage);
    demo_mode("1d20 + 5", Advantage::Disadvantage);
}

fn demo_roll(formula: &str, description: &str) {
    let outcome = DiceFormula::parse(formula).roll();
    println!("{formula:>16}  ({description}): {outcome}");
}

fn demo_mode(formula: &str, mode: Advantage) {
    let outcome = evaluate(formula, mode);
    println!("{formula}{}:", mode.label_suffix());
    println!("{}", outcome.details);
    println!("kept {}\n", outcome.total);
}
