//! Flat stack-machine encoding of a `RenderProgram` (§4.D "Instruction
//! form"): each node emits its children (reverse order), then its own
//! opcode. `RenderInstructionLocation` labels are resolved by a two-pass
//! writer, mirroring §6.2's binary encoding without committing to its exact
//! byte layout (implemented by `encode_binary` below).

use std::rc::Rc;

use crate::arrangement::PathId;

use super::{BlendMode, Color, ComposeOp, RenderProgram};

#[derive(Clone, Debug, PartialEq)]
pub enum Instruction {
    PushColor(Color),
    PathBooleanJump { path: PathId, outside_label: usize },
    Jump(usize),
    Label(usize),
    Alpha(f64),
    Blend(BlendMode),
    Compose(ComposeOp),
    ComputeLinearBlendRatio { start: (f64, f64), end: (f64, f64) },
    LinearGradient(Vec<(f64, Color)>),
    Premultiply,
    Unpremultiply,
    LinearSrgbToSrgb,
    SrgbToLinearSrgb,
    Return,
}

/// Write `program` as a flat instruction list. Labels are resolved
/// immediately since this writer walks the tree directly rather than a
/// DAG with back-references; a content-hashed cache (§9) would change that.
pub fn write_instructions(program: &Rc<RenderProgram>) -> Vec<Instruction> {
    let mut out = Vec::new();
    let mut next_label = 0usize;
    write_node(program, &mut out, &mut next_label);
    out.push(Instruction::Return);
    out
}

fn write_node(program: &Rc<RenderProgram>, out: &mut Vec<Instruction>, next_label: &mut usize) {
    match program.as_ref() {
        RenderProgram::Color(c) => out.push(Instruction::PushColor(*c)),
        RenderProgram::PathBoolean(path, inside, outside) => {
            let outside_label = *next_label;
            *next_label += 1;
            let end_label = *next_label;
            *next_label += 1;
            out.push(Instruction::PathBooleanJump { path: *path, outside_label });
            write_node(inside, out, next_label);
            out.push(Instruction::Jump(end_label));
            out.push(Instruction::Label(outside_label));
            write_node(outside, out, next_label);
            out.push(Instruction::Label(end_label));
        }
        RenderProgram::Alpha(child, a) => {
            write_node(child, out, next_label);
            out.push(Instruction::Alpha(*a));
        }
        RenderProgram::Blend(a, b, mode) => {
            write_node(b, out, next_label);
            write_node(a, out, next_label);
            out.push(Instruction::Blend(*mode));
        }
        RenderProgram::Compose(a, b, op) => {
            write_node(b, out, next_label);
            write_node(a, out, next_label);
            out.push(Instruction::Compose(*op));
        }
        RenderProgram::LinearGradient { start, end, stops } => {
            out.push(Instruction::ComputeLinearBlendRatio { start: *start, end: *end });
            out.push(Instruction::LinearGradient(stops.clone()));
        }
        RenderProgram::Premultiply(child) => {
            write_node(child, out, next_label);
            out.push(Instruction::Premultiply);
        }
        RenderProgram::Unpremultiply(child) => {
            write_node(child, out, next_label);
            out.push(Instruction::Unpremultiply);
        }
        RenderProgram::LinearSrgbToSrgb(child) => {
            write_node(child, out, next_label);
            out.push(Instruction::LinearSrgbToSrgb);
        }
        RenderProgram::SrgbToLinearSrgb(child) => {
            write_node(child, out, next_label);
            out.push(Instruction::SrgbToLinearSrgb);
        }
    }
}

/// Interpret an instruction list against one evaluation point, given a path
/// membership test and a centroid for gradient sampling. A reference
/// implementation of the stack-executor named in §4.D; the GPU path would
/// consume `encode_binary`'s byte form instead.
pub fn run(instructions: &[Instruction], path_test: &dyn Fn(PathId) -> bool, centroid: Option<(f64, f64)>) -> Color {
    let mut stack: Vec<Color> = Vec::new();
    let mut pc = 0usize;
    while pc < instructions.len() {
        match &instructions[pc] {
            Instruction::PushColor(c) => stack.push(*c),
            Instruction::PathBooleanJump { path, outside_label } => {
                if !path_test(*path) {
                    pc = find_label(instructions, *outside_label);
                }
            }
            Instruction::Jump(label) => pc = find_label(instructions, *label),
            Instruction::Label(_) => {}
            Instruction::Alpha(a) => {
                let c = stack.pop().unwrap_or(Color::TRANSPARENT);
                stack.push(c.scaled(*a));
            }
            Instruction::Blend(mode) => {
                let b = stack.pop().unwrap_or(Color::TRANSPARENT);
                let a = stack.pop().unwrap_or(Color::TRANSPARENT);
                stack.push(super::blend(a, b, *mode));
            }
            Instruction::Compose(op) => {
                let b = stack.pop().unwrap_or(Color::TRANSPARENT);
                let a = stack.pop().unwrap_or(Color::TRANSPARENT);
                stack.push(super::compose(a, b, *op));
            }
            Instruction::ComputeLinearBlendRatio { .. } => {}
            Instruction::LinearGradient(stops) => {
                let point = centroid.unwrap_or((0.0, 0.0));
                stack.push(super::sample_linear_gradient((0.0, 0.0), (1.0, 0.0), stops, point));
            }
            Instruction::Premultiply => {
                let c = stack.pop().unwrap_or(Color::TRANSPARENT);
                stack.push(Color::new(c.r * c.a, c.g * c.a, c.b * c.a, c.a));
            }
            Instruction::Unpremultiply => {
                let c = stack.pop().unwrap_or(Color::TRANSPARENT);
                stack.push(if c.a == 0.0 { Color::TRANSPARENT } else { Color::new(c.r / c.a, c.g / c.a, c.b / c.a, c.a) });
            }
            Instruction::LinearSrgbToSrgb => {
                let c = stack.pop().unwrap_or(Color::TRANSPARENT);
                stack.push(Color::new(super::linear_to_srgb(c.r), super::linear_to_srgb(c.g), super::linear_to_srgb(c.b), c.a));
            }
            Instruction::SrgbToLinearSrgb => {
                let c = stack.pop().unwrap_or(Color::TRANSPARENT);
                stack.push(Color::new(super::srgb_to_linear(c.r), super::srgb_to_linear(c.g), super::srgb_to_linear(c.b), c.a));
            }
            Instruction::Return => break,
        }
        pc += 1;
    }
    stack.pop().unwrap_or(Color::TRANSPARENT)
}

fn find_label(instructions: &[Instruction], label: usize) -> usize {
    instructions
        .iter()
        .position(|i| matches!(i, Instruction::Label(l) if *l == label))
        .expect("jump target label must exist in the same instruction list")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn constant_color_round_trips_through_the_stack_machine() {
        let program = Rc::new(RenderProgram::Color(Color::new(1.0, 0.0, 0.0, 1.0)));
        let instructions = write_instructions(&program);
        let result = run(&instructions, &|_| false, None);
        assert_eq!(result, Color::new(1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn path_boolean_selects_branch_matching_the_membership_test() {
        let inside = Rc::new(RenderProgram::Color(Color::new(1.0, 0.0, 0.0, 1.0)));
        let outside = Rc::new(RenderProgram::Color(Color::new(0.0, 0.0, 1.0, 1.0)));
        let program = Rc::new(RenderProgram::PathBoolean(PathId(0), inside, outside));
        let instructions = write_instructions(&program);
        assert_eq!(run(&instructions, &|_| true, None), Color::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(run(&instructions, &|_| false, None), Color::new(0.0, 0.0, 1.0, 1.0));
    }
}
