// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A declaration-level GLSL ES 1.00 reader.
//!
//! It does not type-check shader bodies. It extracts the `attribute`,
//! `uniform` and `varying` declarations of a stage, tells which ones are
//! referenced, and emulates the interface checks a driver performs when
//! compiling and linking.

use prism_core::renderer::api::pipeline::{ActiveAttribute, ActiveUniform, ShaderDataType, ShaderStage};
use prism_core::renderer::UniformLocation;
use std::collections::BTreeMap;

/// Storage qualifier of an interface declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Qualifier {
    Attribute,
    Uniform,
    Varying,
}

impl Qualifier {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "attribute" => Some(Qualifier::Attribute),
            "uniform" => Some(Qualifier::Uniform),
            "varying" => Some(Qualifier::Varying),
            _ => None,
        }
    }
}

/// One declared interface variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Declaration {
    pub qualifier: Qualifier,
    pub data_type: ShaderDataType,
    pub name: String,
    /// 1 for non-arrays.
    pub array_len: u32,
    /// Whether the name is referenced outside its declaration.
    pub active: bool,
}

/// The interface of one compiled stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StageInterface {
    pub stage: ShaderStage,
    pub declarations: Vec<Declaration>,
}

impl StageInterface {
    fn find(&self, qualifier: Qualifier, name: &str) -> Option<&Declaration> {
        self.declarations
            .iter()
            .find(|d| d.qualifier == qualifier && d.name == name)
    }
}

/// The reflection of a linked program.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct LinkedInterface {
    pub attributes: Vec<ActiveAttribute>,
    pub uniforms: Vec<ActiveUniform>,
}

const PRECISION_QUALIFIERS: [&str; 3] = ["lowp", "mediump", "highp"];

/// Compiles one stage.
///
/// # Errors
///
/// A driver-style log when the source has an `#error` directive, declares
/// an interface variable of unknown type, declares an attribute outside the
/// vertex stage, or has no `main` function.
pub(crate) fn compile(stage: ShaderStage, source: &str) -> Result<StageInterface, String> {
    let code = strip_comments(source);

    for (index, line) in code.lines().enumerate() {
        let line = line.trim_start();
        if let Some(message) = line.strip_prefix("#error") {
            return Err(format!("ERROR: 0:{}: '#error' : {}", index + 1, message.trim()));
        }
    }

    let mut declarations = Vec::new();
    for (offset, statement) in statements(&code) {
        let line = code[..offset].matches('\n').count() + 1;
        parse_statement(stage, statement, line, &mut declarations)?;
    }

    let identifiers = identifiers(&code);
    if !identifiers.windows(2).any(|pair| pair[0] == "void" && pair[1] == "main") {
        return Err("ERROR: 0:0: '' : missing main function".to_owned());
    }

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for &identifier in &identifiers {
        *counts.entry(identifier).or_default() += 1;
    }
    let mut declared: BTreeMap<String, usize> = BTreeMap::new();
    for declaration in &declarations {
        *declared.entry(declaration.name.clone()).or_default() += 1;
    }
    for declaration in &mut declarations {
        let uses = counts.get(declaration.name.as_str()).copied().unwrap_or(0);
        declaration.active = uses > declared[&declaration.name];
    }

    Ok(StageInterface { stage, declarations })
}

/// Links a vertex and a fragment stage.
///
/// Active attributes get consecutive locations in declaration order. Active
/// uniforms are numbered in declaration order, vertex stage first, each
/// taking as many locations as its array length. Array uniforms are
/// reported as `NAME[0]`.
///
/// # Errors
///
/// A driver-style log when the stages are swapped, when the fragment stage
/// reads a varying the vertex stage does not declare, or when both stages
/// declare a uniform with different types.
pub(crate) fn link(vertex: &StageInterface, fragment: &StageInterface) -> Result<LinkedInterface, String> {
    if vertex.stage != ShaderStage::Vertex {
        return Err(format!("error: {} shader attached as the vertex stage", vertex.stage));
    }
    if fragment.stage != ShaderStage::Fragment {
        return Err(format!("error: {} shader attached as the fragment stage", fragment.stage));
    }

    for varying in fragment
        .declarations
        .iter()
        .filter(|d| d.qualifier == Qualifier::Varying && d.active)
    {
        match vertex.find(Qualifier::Varying, &varying.name) {
            None => {
                return Err(format!(
                    "error: varying '{}' is read by the fragment shader but not declared in the vertex shader",
                    varying.name
                ))
            }
            Some(written) if written.data_type != varying.data_type => {
                return Err(format!(
                    "error: varying '{}' is declared as {} and {}",
                    varying.name, written.data_type, varying.data_type
                ))
            }
            Some(_) => {}
        }
    }

    let mut linked = LinkedInterface::default();

    let mut next_attribute = 0;
    for attribute in vertex
        .declarations
        .iter()
        .filter(|d| d.qualifier == Qualifier::Attribute && d.active)
    {
        linked.attributes.push(ActiveAttribute {
            name: attribute.name.clone(),
            size: attribute.array_len,
            data_type: attribute.data_type,
            location: next_attribute,
        });
        next_attribute += attribute_slots(attribute.data_type) * attribute.array_len;
    }

    let mut uniforms: Vec<(&Declaration, bool)> = Vec::new();
    for declaration in vertex
        .declarations
        .iter()
        .chain(fragment.declarations.iter())
        .filter(|d| d.qualifier == Qualifier::Uniform)
    {
        match uniforms.iter_mut().find(|(seen, _)| seen.name == declaration.name) {
            Some((seen, active)) => {
                if seen.data_type != declaration.data_type || seen.array_len != declaration.array_len {
                    return Err(format!(
                        "error: uniform '{}' is declared with different types in the vertex and fragment shaders",
                        declaration.name
                    ));
                }
                *active |= declaration.active;
            }
            None => uniforms.push((declaration, declaration.active)),
        }
    }

    let mut next_uniform = 0;
    for (declaration, _) in uniforms.into_iter().filter(|(_, active)| *active) {
        let name = if declaration.array_len > 1 {
            format!("{}[0]", declaration.name)
        } else {
            declaration.name.clone()
        };
        linked.uniforms.push(ActiveUniform {
            name,
            size: declaration.array_len,
            data_type: declaration.data_type,
            location: UniformLocation(next_uniform),
        });
        next_uniform += declaration.array_len;
    }

    Ok(linked)
}

fn attribute_slots(data_type: ShaderDataType) -> u32 {
    match data_type {
        ShaderDataType::FloatMat2 => 2,
        ShaderDataType::FloatMat3 => 3,
        ShaderDataType::FloatMat4 => 4,
        _ => 1,
    }
}

fn parse_statement(
    stage: ShaderStage,
    statement: &str,
    line: usize,
    declarations: &mut Vec<Declaration>,
) -> Result<(), String> {
    let mut tokens = statement.split_whitespace();
    let Some(qualifier) = tokens.next().and_then(Qualifier::parse) else {
        return Ok(());
    };
    if qualifier == Qualifier::Attribute && stage != ShaderStage::Vertex {
        return Err(format!(
            "ERROR: 0:{line}: 'attribute' : supported in vertex shaders only"
        ));
    }

    let mut tokens = tokens.skip_while(|t| PRECISION_QUALIFIERS.contains(t));
    let type_name = tokens.next().unwrap_or_default();
    let data_type = ShaderDataType::from_glsl_name(type_name)
        .ok_or_else(|| format!("ERROR: 0:{line}: '{type_name}' : syntax error: unknown type"))?;

    let declarators: String = tokens.collect::<Vec<_>>().join(" ");
    for declarator in declarators.split(',') {
        let (name, array_len) = parse_declarator(declarator)
            .ok_or_else(|| format!("ERROR: 0:{line}: '{}' : syntax error", declarator.trim()))?;
        declarations.push(Declaration {
            qualifier,
            data_type,
            name,
            array_len,
            active: false,
        });
    }
    Ok(())
}

/// Parses `NAME` or `NAME[N]`.
fn parse_declarator(declarator: &str) -> Option<(String, u32)> {
    let compact: String = declarator.chars().filter(|c| !c.is_whitespace()).collect();
    let (name, array_len) = match compact.split_once('[') {
        Some((name, rest)) => {
            let len = rest.strip_suffix(']')?.parse::<u32>().ok().filter(|&n| n > 0)?;
            (name.to_owned(), len)
        }
        None => (compact, 1),
    };
    let valid = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    valid.then_some((name, array_len))
}

/// Removes `//` and `/* */` comments, keeping newlines so line numbers hold.
fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        let next = chars.peek().copied();
        match (c, next) {
            ('/', Some('/')) => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut previous = '\0';
                for c in chars.by_ref() {
                    if c == '\n' {
                        out.push('\n');
                    }
                    if previous == '*' && c == '/' {
                        break;
                    }
                    previous = c;
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Splits top-level code into statements at `;`, `{` and `}`, skipping
/// preprocessor lines. Yields each statement with its byte offset.
fn statements(code: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for (index, c) in code.char_indices() {
        if matches!(c, ';' | '{' | '}') {
            pieces.push((start, &code[start..index]));
            start = index + 1;
        }
    }
    pieces.push((start, &code[start..]));

    pieces.into_iter().filter_map(|(offset, piece)| {
        let kept: Vec<&str> = piece
            .lines()
            .filter(|line| !line.trim_start().starts_with('#'))
            .collect();
        let text = kept.join("\n");
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        // Re-anchor on the first non-blank character of the original piece.
        let lead = piece.find(trimmed.split_whitespace().next()?)?;
        Some((offset + lead, &piece[lead..]))
    })
}

fn identifiers(code: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = None;
    for (index, c) in code.char_indices() {
        let part_of_identifier = c.is_ascii_alphanumeric() || c == '_';
        match (start, part_of_identifier) {
            (None, true) => start = Some(index),
            (Some(s), false) => {
                out.push(&code[s..index]);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        out.push(&code[s..]);
    }
    out.retain(|identifier| !identifier.starts_with(|c: char| c.is_ascii_digit()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const VS: &str = "\
// transforms
uniform highp mat4 WORLDVIEW;
uniform highp vec4 WEIGHTS[4];
uniform lowp vec4 UNUSED;
attribute highp vec3 POSITION;
attribute highp vec2 TEXCOORD;
attribute highp vec3 NORMAL;
varying highp vec2 vTEXCOORD;
void main() {
    vTEXCOORD = TEXCOORD;
    gl_Position = WORLDVIEW * vec4(POSITION, 1.0) * WEIGHTS[0].x;
}
";

    const FS: &str = "\
precision mediump float;
varying highp vec2 vTEXCOORD;
uniform sampler2D BLITSAMPLER;
/* WORLDVIEW is shared */
uniform highp mat4 WORLDVIEW;
void main() {
    gl_FragColor = texture2D(BLITSAMPLER, vTEXCOORD);
}
";

    #[test]
    fn test_compile_collects_declarations_and_activity() {
        let vs = compile(ShaderStage::Vertex, VS).unwrap();
        let names: Vec<(&str, bool)> = vs.declarations.iter().map(|d| (d.name.as_str(), d.active)).collect();
        assert_eq!(
            names,
            vec![
                ("WORLDVIEW", true),
                ("WEIGHTS", true),
                ("UNUSED", false),
                ("POSITION", true),
                ("TEXCOORD", true),
                ("NORMAL", false),
                ("vTEXCOORD", true),
            ]
        );
        assert_eq!(vs.declarations[1].array_len, 4);
        assert_eq!(vs.declarations[1].data_type, ShaderDataType::FloatVec4);
    }

    #[test]
    fn test_link_assigns_locations_in_declaration_order() {
        let vs = compile(ShaderStage::Vertex, VS).unwrap();
        let fs = compile(ShaderStage::Fragment, FS).unwrap();
        let linked = link(&vs, &fs).unwrap();

        let attributes: Vec<(&str, u32)> = linked.attributes.iter().map(|a| (a.name.as_str(), a.location)).collect();
        assert_eq!(attributes, vec![("POSITION", 0), ("TEXCOORD", 1)]);

        let uniforms: Vec<(&str, u32, u32)> = linked
            .uniforms
            .iter()
            .map(|u| (u.name.as_str(), u.size, u.location.0))
            .collect();
        assert_eq!(
            uniforms,
            vec![("WORLDVIEW", 1, 0), ("WEIGHTS[0]", 4, 1), ("BLITSAMPLER", 1, 5)]
        );
    }

    #[test]
    fn test_compile_errors() {
        let err = compile(ShaderStage::Fragment, "#error not yet\nvoid main() {}").unwrap_err();
        assert_eq!(err, "ERROR: 0:1: '#error' : not yet");

        let err = compile(ShaderStage::Vertex, "uniform highp quat Q;\nvoid main() {}").unwrap_err();
        assert!(err.contains("'quat'"), "{err}");
        assert!(err.starts_with("ERROR: 0:1:"), "{err}");

        let err = compile(ShaderStage::Vertex, "void notmain() {}").unwrap_err();
        assert!(err.contains("main"));

        let err = compile(ShaderStage::Fragment, "attribute vec3 P;\nvoid main() { P; }").unwrap_err();
        assert!(err.contains("vertex shaders only"));
    }

    #[test]
    fn test_line_numbers_skip_comments() {
        let source = "// header\n/* block\n comment */\nuniform mat5 M;\nvoid main() {}";
        let err = compile(ShaderStage::Vertex, source).unwrap_err();
        assert!(err.starts_with("ERROR: 0:4:"), "{err}");
    }

    #[test]
    fn test_link_errors() {
        let vs = compile(ShaderStage::Vertex, "void main() { gl_Position = vec4(0.0); }").unwrap();
        let fs = compile(ShaderStage::Fragment, FS).unwrap();
        let err = link(&vs, &fs).unwrap_err();
        assert!(err.contains("vTEXCOORD"));

        let err = link(&fs, &vs).unwrap_err();
        assert!(err.contains("vertex stage"));

        let vs = compile(
            ShaderStage::Vertex,
            "uniform vec4 C;\nvoid main() { gl_Position = C; }",
        )
        .unwrap();
        let fs = compile(
            ShaderStage::Fragment,
            "uniform vec3 C;\nvoid main() { gl_FragColor = vec4(C, 1.0); }",
        )
        .unwrap();
        let err = link(&vs, &fs).unwrap_err();
        assert!(err.contains("uniform 'C'"));
    }

    #[test]
    fn test_multiple_declarators() {
        let vs = compile(
            ShaderStage::Vertex,
            "uniform float A, B [2];\nvoid main() { gl_Position = vec4(A, B[1], 0.0, 1.0); }",
        )
        .unwrap();
        let decls: Vec<(&str, u32)> = vs.declarations.iter().map(|d| (d.name.as_str(), d.array_len)).collect();
        assert_eq!(decls, vec![("A", 1), ("B", 2)]);
    }
}
