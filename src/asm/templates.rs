//! Instruction templates.
//!
//! The generator only decides *what* to fill into each template; the text
//! of the instructions is owned by a [`Templates`] implementation. [`Mips`]
//! targets the SPIM simulator.
//!
//! Every expression fragment leaves its value in the accumulator `$t0`.

/// SPIM service code to print an integer.
pub const PRINT_INT: u32 = 1;
/// SPIM service code to print a NUL-terminated string.
pub const PRINT_STRING: u32 = 4;

/// Labels used by one string concatenation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConcatLabels {
    pub measure_left: String,
    pub measure_right: String,
    pub allocate: String,
    pub copy_left: String,
    pub copy_right: String,
}

pub trait Templates {
    fn program(&self, variables: &str, string_literals: &str, main: &str) -> String;

    fn variable_cell(&self, label: &str) -> String;
    fn string_literal(&self, label: &str, value: &str) -> String;

    fn load_immediate(&self, value: i32) -> String;
    fn load_address(&self, label: &str) -> String;
    fn load_variable(&self, cell: &str) -> String;
    fn store_variable(&self, value: &str, cell: &str) -> String;

    fn print_bool(&self, operand: &str) -> String;
    fn print_int_or_string(&self, operand: &str, service_code: u32) -> String;

    fn if_(&self, condition: &str, true_body: &str, endif_label: &str) -> String;
    fn if_else(
        &self,
        condition: &str,
        true_body: &str,
        false_body: &str,
        else_label: &str,
        endif_label: &str,
    ) -> String;
    fn while_(&self, condition: &str, body: &str, start_label: &str, end_label: &str) -> String;

    /// `operator` combines the saved left operand in `$t1` with the right
    /// operand in `$t0` and leaves the result in `$t0`.
    fn binary(&self, operator: &str, left: &str, right: &str) -> String;
    fn unary_minus(&self, operand: &str) -> String;
    fn logical_not(&self, operand: &str) -> String;
    fn concat_strings(&self, left: &str, right: &str, labels: &ConcatLabels) -> String;
}

fn instr(op: &str, operands: &str) -> String {
    format!("{:<6} {}", op, operands)
}

fn label(name: &str) -> String {
    format!("{}:", name)
}

// Joins the non-empty parts with newlines.
fn lines(parts: &[&str]) -> String {
    parts
        .iter()
        .copied()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

// Evaluates `left`, pushes it, evaluates `right`, then pops the left value
// into `$t1`. `$sp` points at the last word in use, so a push reserves the
// word before storing into it.
fn with_saved_left(left: &str, right: &str) -> String {
    lines(&[
        left,
        &instr("addiu", "$sp $sp -4"),
        &instr("sw", "$t0 0($sp)"),
        right,
        &instr("lw", "$t1 0($sp)"),
        &instr("addiu", "$sp $sp 4"),
    ])
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Mips;

impl Templates for Mips {
    fn program(&self, variables: &str, string_literals: &str, main: &str) -> String {
        let mut program = lines(&[
            ".data",
            "bool_true: .asciiz \"true\"",
            "bool_false: .asciiz \"false\"",
            variables,
            string_literals,
            "",
            ".text",
            "main:",
            main,
            &instr("li", "$v0 10"),
            "syscall",
        ]);

        program.push('\n');
        program
    }

    fn variable_cell(&self, label: &str) -> String {
        format!("{}: .word 0", label)
    }

    fn string_literal(&self, label: &str, value: &str) -> String {
        format!("{}: .asciiz \"{}\"", label, value)
    }

    fn load_immediate(&self, value: i32) -> String {
        instr("li", &format!("$t0 {}", value))
    }

    fn load_address(&self, label: &str) -> String {
        instr("la", &format!("$t0 {}", label))
    }

    fn load_variable(&self, cell: &str) -> String {
        instr("lw", &format!("$t0 {}", cell))
    }

    fn store_variable(&self, value: &str, cell: &str) -> String {
        lines(&[value, &instr("sw", &format!("$t0 {}", cell))])
    }

    fn print_bool(&self, operand: &str) -> String {
        lines(&[
            operand,
            &instr("la", "$a0 bool_false"),
            &instr("la", "$t1 bool_true"),
            &instr("movn", "$a0 $t1 $t0"),
            &instr("li", &format!("$v0 {}", PRINT_STRING)),
            "syscall",
        ])
    }

    fn print_int_or_string(&self, operand: &str, service_code: u32) -> String {
        lines(&[
            operand,
            &instr("move", "$a0 $t0"),
            &instr("li", &format!("$v0 {}", service_code)),
            "syscall",
        ])
    }

    fn if_(&self, condition: &str, true_body: &str, endif_label: &str) -> String {
        lines(&[
            condition,
            &instr("beqz", &format!("$t0 {}", endif_label)),
            true_body,
            &label(endif_label),
        ])
    }

    fn if_else(
        &self,
        condition: &str,
        true_body: &str,
        false_body: &str,
        else_label: &str,
        endif_label: &str,
    ) -> String {
        lines(&[
            condition,
            &instr("beqz", &format!("$t0 {}", else_label)),
            true_body,
            &instr("j", endif_label),
            &label(else_label),
            false_body,
            &label(endif_label),
        ])
    }

    fn while_(&self, condition: &str, body: &str, start_label: &str, end_label: &str) -> String {
        lines(&[
            &label(start_label),
            condition,
            &instr("beqz", &format!("$t0 {}", end_label)),
            body,
            &instr("j", start_label),
            &label(end_label),
        ])
    }

    fn binary(&self, operator: &str, left: &str, right: &str) -> String {
        lines(&[
            &with_saved_left(left, right),
            &instr(operator, "$t0 $t1 $t0"),
        ])
    }

    fn unary_minus(&self, operand: &str) -> String {
        lines(&[operand, &instr("sub", "$t0 $zero $t0")])
    }

    fn logical_not(&self, operand: &str) -> String {
        lines(&[operand, &instr("xori", "$t0 $t0 1")])
    }

    // $t1: left, $t0: right, $t4: length of the result including NUL.
    // The result is a fresh buffer from `sbrk` (service 9).
    fn concat_strings(&self, left: &str, right: &str, labels: &ConcatLabels) -> String {
        lines(&[
            &with_saved_left(left, right),
            &instr("move", "$t2 $t1"),
            &instr("move", "$t3 $t0"),
            &instr("li", "$t4 1"),
            &label(&labels.measure_left),
            &instr("lb", "$t5 0($t2)"),
            &instr("beqz", &format!("$t5 {}", labels.measure_right)),
            &instr("addiu", "$t4 $t4 1"),
            &instr("addiu", "$t2 $t2 1"),
            &instr("j", &labels.measure_left),
            &label(&labels.measure_right),
            &instr("lb", "$t5 0($t3)"),
            &instr("beqz", &format!("$t5 {}", labels.allocate)),
            &instr("addiu", "$t4 $t4 1"),
            &instr("addiu", "$t3 $t3 1"),
            &instr("j", &labels.measure_right),
            &label(&labels.allocate),
            &instr("move", "$a0 $t4"),
            &instr("li", "$v0 9"),
            "syscall",
            &instr("move", "$t2 $v0"),
            &label(&labels.copy_left),
            &instr("lb", "$t5 0($t1)"),
            &instr("beqz", &format!("$t5 {}", labels.copy_right)),
            &instr("sb", "$t5 0($t2)"),
            &instr("addiu", "$t1 $t1 1"),
            &instr("addiu", "$t2 $t2 1"),
            &instr("j", &labels.copy_left),
            &label(&labels.copy_right),
            &instr("lb", "$t5 0($t0)"),
            &instr("sb", "$t5 0($t2)"),
            &instr("addiu", "$t0 $t0 1"),
            &instr("addiu", "$t2 $t2 1"),
            &instr("bnez", &format!("$t5 {}", labels.copy_right)),
            &instr("move", "$t0 $v0"),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn if_without_else() {
        let code = Mips.if_(&Mips.load_immediate(1), &Mips.load_immediate(2), "endif_0");

        assert_eq!(
            code,
            "li     $t0 1\nbeqz   $t0 endif_0\nli     $t0 2\nendif_0:"
        );
    }

    #[test]
    fn empty_parts_are_skipped() {
        let code = Mips.while_(&Mips.load_immediate(0), "", "loop_start_0", "loop_end_1");

        assert_eq!(
            code,
            "loop_start_0:\nli     $t0 0\nbeqz   $t0 loop_end_1\nj      loop_start_0\nloop_end_1:"
        );
    }

    #[test]
    fn binary_saves_left_operand() {
        let code = Mips.binary("add", &Mips.load_immediate(1), &Mips.load_immediate(2));
        let lines = code.lines().collect::<Vec<_>>();

        assert_eq!(
            lines,
            vec![
                "li     $t0 1",
                "addiu  $sp $sp -4",
                "sw     $t0 0($sp)",
                "li     $t0 2",
                "lw     $t1 0($sp)",
                "addiu  $sp $sp 4",
                "add    $t0 $t1 $t0",
            ]
        );
    }

    #[test]
    fn print_int() {
        let code = Mips.print_int_or_string(&Mips.load_variable("var_main_x"), PRINT_INT);

        assert_eq!(
            code,
            "lw     $t0 var_main_x\nmove   $a0 $t0\nli     $v0 1\nsyscall"
        );
    }
}
