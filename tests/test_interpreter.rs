//! The PostScript subset interpreter driven through the public API.

mod common;

use bytes::Bytes;
use pdftext::fonts::CMap;
use pdftext::interpreter::{interpret, interpret_bytes, OperatorHandler, Stack};
use pdftext::{Dict, Error, Result, Value};

/// Integer calculator with `add`, `mul` and `print`.
#[derive(Default)]
struct Calculator {
    printed: Vec<i64>,
}

impl OperatorHandler for Calculator {
    fn handle(&mut self, stack: &mut Stack, op: &str) -> Result<bool> {
        match op {
            "add" | "mul" => {
                let b = stack.pop().as_integer().unwrap_or(0);
                let a = stack.pop().as_integer().unwrap_or(0);
                stack.push(Value::Integer(if op == "add" { a + b } else { a * b }));
            },
            "print" => {
                let v = stack.pop().as_integer().unwrap_or(0);
                self.printed.push(v);
            },
            "quit" => return Ok(false),
            other => {
                return Err(Error::Unsupported(format!("operator {}", other)));
            },
        }
        Ok(true)
    }
}

fn flate_stream(source: &str) -> Value {
    let mut dict = Dict::new();
    dict.insert("Filter".to_string(), Value::Name("FlateDecode".to_string()));
    Value::Stream {
        dict,
        data: Bytes::from(common::flate(source.as_bytes())),
    }
}

#[test]
fn test_struct_handler() {
    let mut calc = Calculator::default();
    interpret_bytes(b"2 3 add print 4 5 mul print quit 1 print", &mut calc).unwrap();
    assert_eq!(calc.printed, vec![5, 20]);
}

#[test]
fn test_bound_names_act_as_operands() {
    let mut calc = Calculator::default();
    interpret_bytes(
        b"10 dict begin /two 2 def /three 3 def two three mul print end",
        &mut calc,
    )
    .unwrap();
    assert_eq!(calc.printed, vec![6]);
}

#[test]
fn test_unknown_operator_error_surfaces() {
    let mut calc = Calculator::default();
    let result = interpret_bytes(b"1 print frobnicate 2 print", &mut calc);
    assert!(matches!(result, Err(Error::Unsupported(_))));
    assert_eq!(calc.printed, vec![1]);
}

#[test]
fn test_compressed_program_parts() {
    let program = Value::Array(vec![flate_stream("1 2"), flate_stream("add print")]);
    let mut calc = Calculator::default();
    interpret(&program, &mut calc).unwrap();
    assert_eq!(calc.printed, vec![3]);
}

#[test]
fn test_parts_do_not_run_together() {
    let program = Value::Array(vec![flate_stream("1"), flate_stream("2 add print")]);
    let mut calc = Calculator::default();
    interpret(&program, &mut calc).unwrap();
    assert_eq!(calc.printed, vec![3]);
}

#[test]
fn test_cmap_program_from_stream() {
    let program = flate_stream(
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         /CMapName /Test def\n\
         1 begincodespacerange <00> <FF> endcodespacerange\n\
         2 beginbfchar <01> <0041> <02> <20AC> endbfchar\n\
         1 beginbfrange <10> <12> <0061> endbfrange\n\
         endcmap\n\
         CMapName currentdict /CMap defineresource pop\n\
         end\n\
         end",
    );
    let cmap = CMap::from_program(&program).unwrap();
    assert_eq!(cmap.decode_str(b"\x01\x02\x10\x11\x12"), "A\u{20AC}abc");
    assert_eq!(cmap.decode_str(b"\x03"), "\u{FFFD}");
}
