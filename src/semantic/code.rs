//! Three-address instructions and the append-only code buffer
//!
//! Lines are numbered from 1. Jumps whose target is not yet known are
//! emitted with `target: None` and patched in place later; nothing else is
//! ever rewritten.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// `dst = src`
    Copy { src: String, dst: String },
    /// `dst = lhs op rhs`
    Binary {
        op: String,
        lhs: String,
        rhs: String,
        dst: String,
    },
    /// `goto target`
    Jump { target: Option<usize> },
    /// `if lhs op rhs goto target`
    CondJump {
        op: String,
        lhs: String,
        rhs: String,
        target: Option<usize>,
    },
    /// `if cond goto target`
    JumpNonZero { cond: String, target: Option<usize> },
}

impl Instruction {
    /// Set the jump target. No-op for non-jumps.
    pub fn patch(&mut self, line: usize) {
        match self {
            Instruction::Jump { target }
            | Instruction::CondJump { target, .. }
            | Instruction::JumpNonZero { target, .. } => *target = Some(line),
            Instruction::Copy { .. } | Instruction::Binary { .. } => {}
        }
    }

    pub fn target(&self) -> Option<usize> {
        match self {
            Instruction::Jump { target }
            | Instruction::CondJump { target, .. }
            | Instruction::JumpNonZero { target, .. } => *target,
            Instruction::Copy { .. } | Instruction::Binary { .. } => None,
        }
    }

    /// The `(op, arg1, arg2, result)` form.
    pub fn quad(&self) -> Quad {
        let target = |t: &Option<usize>| t.map_or_else(|| "_".to_string(), |t| t.to_string());
        match self {
            Instruction::Copy { src, dst } => Quad::new("=", src, "", dst),
            Instruction::Binary { op, lhs, rhs, dst } => Quad::new(op, lhs, rhs, dst),
            Instruction::Jump { target: t } => Quad::new("j", "", "", &target(t)),
            Instruction::CondJump {
                op,
                lhs,
                rhs,
                target: t,
            } => Quad::new(&format!("j{}", op), lhs, rhs, &target(t)),
            Instruction::JumpNonZero { cond, target: t } => Quad::new("jnz", cond, "", &target(t)),
        }
    }
}

/// Human-readable mirror.
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = |t: &Option<usize>| t.map_or_else(|| "_".to_string(), |t| t.to_string());
        match self {
            Instruction::Copy { src, dst } => write!(f, "{} = {}", dst, src),
            Instruction::Binary { op, lhs, rhs, dst } => {
                write!(f, "{} = {} {} {}", dst, lhs, op, rhs)
            }
            Instruction::Jump { target: t } => write!(f, "goto {}", target(t)),
            Instruction::CondJump {
                op,
                lhs,
                rhs,
                target: t,
            } => write!(f, "if {} {} {} goto {}", lhs, op, rhs, target(t)),
            Instruction::JumpNonZero { cond, target: t } => {
                write!(f, "if {} goto {}", cond, target(t))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quad {
    pub op: String,
    pub arg1: String,
    pub arg2: String,
    pub result: String,
}

impl Quad {
    fn new(op: &str, arg1: &str, arg2: &str, result: &str) -> Self {
        Quad {
            op: op.to_string(),
            arg1: arg1.to_string(),
            arg2: arg2.to_string(),
            result: result.to_string(),
        }
    }
}

impl fmt::Display for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.op, self.arg1, self.arg2, self.result)
    }
}

/// One numbered output line, as reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeLine {
    pub index: usize,
    #[serde(flatten)]
    pub quad: Quad,
    pub text: String,
}

impl fmt::Display for CodeLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}  {}", self.index, self.quad, self.text)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeBuffer {
    instructions: Vec<Instruction>,
}

impl CodeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append and return the new line number.
    pub fn emit(&mut self, instruction: Instruction) -> usize {
        log::trace!("emit {}: {}", self.next_line(), instruction);
        self.instructions.push(instruction);
        self.instructions.len()
    }

    /// Line number the next `emit` will get.
    pub fn next_line(&self) -> usize {
        self.instructions.len() + 1
    }

    /// Backpatch the jump on `line` to `target`. Returns `false` if there is
    /// no such line.
    pub fn patch(&mut self, line: usize, target: usize) -> bool {
        match line.checked_sub(1).and_then(|i| self.instructions.get_mut(i)) {
            Some(instruction) => {
                instruction.patch(target);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, line: usize) -> Option<&Instruction> {
        self.instructions.get(line.checked_sub(1)?)
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn lines(&self) -> Vec<CodeLine> {
        self.instructions
            .iter()
            .enumerate()
            .map(|(i, instruction)| CodeLine {
                index: i + 1,
                quad: instruction.quad(),
                text: instruction.to_string(),
            })
            .collect()
    }

    /// `index: (op, arg1, arg2, result)  mirror`, one string per line.
    pub fn render(&self) -> Vec<String> {
        self.lines().iter().map(CodeLine::to_string).collect()
    }
}

impl Serialize for CodeBuffer {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.lines())
    }
}
