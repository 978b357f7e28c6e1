//! Weld mode: run buffering, welding statements and invariant failures.

use gcode2as::ConversionError;
use gcode2as::convert::{ConversionOptions, Point, convert};
use gcode2as::emit::{Emitter, Statement};
use gcode2as::parser::parse_program;
use gcode2as::signal::{Mode, WeldSettings};

fn weld_options() -> ConversionOptions {
    ConversionOptions {
        mode: Mode::Weld(WeldSettings {
            welding_speed: 15.0,
            condition: 1,
        }),
        ..ConversionOptions::default()
    }
}

fn is_weld(statement: &Statement) -> bool {
    matches!(
        statement,
        Statement::WeldStart { .. } | Statement::WeldContinue { .. } | Statement::WeldEnd { .. }
    )
}

#[test]
fn test_run_becomes_one_weld_block() {
    let source = "\
G0 X0 Y0 Z1
G1 X10 E1 F300
G1 X10 Y10 E2
G1 X0 Y10 E3
G0 Z20
";
    let parsed = parse_program(source);
    let conversion = convert(parsed.commands, &weld_options()).expect("convert");
    let text = conversion.render(&Emitter::default()).concat();

    let welds: Vec<&Statement> = conversion.statements.iter().filter(|s| is_weld(s)).collect();
    assert_eq!(welds.len(), 4, "three linear moves give k + 1 welding statements");

    let body = text
        .lines()
        .filter(|l| !l.starts_with(';'))
        .collect::<Vec<_>>()
        .join("\n");
    assert_eq!(
        body,
        "\
W1SET 1 = 15, 1, 1, 0, 0
W2SET 1 = 0.1, 1, 1
LWS SHIFT(a BY 0, 0, 1)
LWC SHIFT(a BY 10, 0, 1), 1
LWC SHIFT(a BY 10, 10, 1), 1
LWE SHIFT(a BY 0, 10, 1), 1, 1
LMOVE SHIFT(a BY 0, 10, 20)"
    );
    assert!(!text.contains("SPEED"), "weld speed comes from the conditions");
}

#[test]
fn test_consecutive_rapids_are_plain_moves() {
    let source = "G0 X0 Y0 Z5\nG0 X10\nG1 X20\nG0 Z10\n";
    let parsed = parse_program(source);
    let conversion = convert(parsed.commands, &weld_options()).expect("convert");

    let targets: Vec<(bool, Point)> = conversion
        .statements
        .iter()
        .filter_map(|s| match s {
            Statement::Move { target, .. } => Some((false, *target)),
            Statement::WeldStart { target, .. } | Statement::WeldEnd { target, .. } => {
                Some((true, *target))
            }
            _ => None,
        })
        .collect();

    assert_eq!(
        targets,
        vec![
            (false, Point::new(0.0, 0.0, 5.0)),
            (true, Point::new(10.0, 0.0, 5.0)),
            (true, Point::new(20.0, 0.0, 5.0)),
            (false, Point::new(20.0, 0.0, 10.0)),
        ]
    );
}

#[test]
fn test_run_without_start_stops_with_partial_output() {
    let source = "G1 X1 Y1 Z1\nG1 X2\nG0 Z5\nG1 X3\n";
    let parsed = parse_program(source);

    let incomplete = convert(parsed.commands, &weld_options()).expect_err("must fail");

    assert_eq!(incomplete.error, ConversionError::MissingWeldStart { line: 3 });
    let pending: Vec<usize> = incomplete.pending.iter().map(|c| c.line).collect();
    assert_eq!(pending, vec![1, 2]);

    // The welding conditions preamble was produced before the failure
    assert!(
        incomplete
            .partial
            .statements
            .iter()
            .any(|s| matches!(s, Statement::WeldConditions { .. }))
    );
    assert!(!incomplete.partial.statements.iter().any(is_weld));
    assert_eq!(incomplete.partial.stats.commands, 3);

    let last = incomplete.partial.diagnostics.last().expect("diagnostic");
    assert_eq!(last.line, 3);
    assert!(last.message.contains("no starting rapid move"));
}

#[test]
fn test_trailing_run_is_flushed_at_end() {
    let parsed = parse_program("G0 X0 Y0 Z1\nG1 X5\nG1 X6\n");
    let conversion = convert(parsed.commands, &weld_options()).expect("convert");

    let last = conversion.statements.last().expect("statements");
    assert!(matches!(
        last,
        Statement::WeldEnd { target, .. } if *target == Point::new(6.0, 0.0, 1.0)
    ));
}

#[test]
fn test_inverted_build_negates_weld_points() {
    let options = ConversionOptions {
        inverted: true,
        ..weld_options()
    };
    let parsed = parse_program("G0 X0 Y0 Z1\nG1 X5\nG1 X10\nG0 Z5\n");
    let conversion = convert(parsed.commands, &options).expect("convert");
    let text = conversion.render(&Emitter::default()).concat();

    assert!(text.contains(
        "LWS SHIFT(a BY 0, 0, -1)\nLWC SHIFT(a BY 5, 0, -1), 1\nLWE SHIFT(a BY 10, 0, -1), 1, 1\n"
    ));
    assert!(text.ends_with("LMOVE SHIFT(a BY 10, 0, -5)\n"));
}
