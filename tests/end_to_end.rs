// ABOUTME: Full pipeline tests driving the public Interpreter API like a script runner would

use miniscript::diagnostics::CollectingSink;
use miniscript::interpreter::Interpreter;
use miniscript::output::CollectingOutput;
use std::fs;
use tempfile::tempdir;

fn run_ok(source: &str) {
    let mut interpreter = Interpreter::new(Box::new(CollectingSink::new()));
    assert!(interpreter.run(source, None), "expected {:?} to run without error", source);
}

fn run_fail(source: &str) -> CollectingSink {
    let sink = CollectingSink::new();
    let mut interpreter = Interpreter::new(Box::new(sink.clone()));
    assert!(!interpreter.run(source, None), "expected {:?} to fail", source);
    sink
}

/// Runs `source` and returns the literal lines its `print` statements
/// produced, for asserting on §8's worked output scenarios.
fn printed_lines(source: &str) -> Vec<String> {
    let output = CollectingOutput::new();
    let mut interpreter = Interpreter::with_output(Box::new(CollectingSink::new()), Box::new(output.clone()));
    assert!(interpreter.run(source, None), "expected {:?} to run without error", source);
    output.lines()
}

#[test]
fn arithmetic_precedence() {
    run_ok("assert 2 + 3 * 4 == 14.0, \"precedence\";");
    run_ok("assert (2 + 3) * 4 == 20.0, \"grouping\";");
}

#[test]
fn string_concatenation_with_plus() {
    run_ok(r#"assert "hello, " + "world" == "hello, world", "concat";"#);
}

#[test]
fn function_call() {
    run_ok(
        r#"
        function square(n) {
            return n * n;
        }
        assert square(5) == 25.0, "square";
        "#,
    );
}

#[test]
fn closure_counter_has_late_binding_state() {
    run_ok(
        r#"
        function make_counter() {
            var count = 0;
            function next() {
                count = count + 1;
                return count;
            }
            return next;
        }
        var a = make_counter();
        var b = make_counter();
        assert a() == 1.0, "a first";
        assert a() == 2.0, "a second";
        assert b() == 1.0, "b independent";
        "#,
    );
}

#[test]
fn list_indexing_and_mutation() {
    run_ok(
        r#"
        var xs = [1, 2, 3];
        xs[0] = xs[0] + 10;
        assert xs[0] == 11, "mutated element";
        assert len(xs) == 3, "length unchanged";
        "#,
    );
}

#[test]
fn failed_assert_halts_the_program() {
    run_fail("assert 1 == 2, \"never equal\";");
}

#[test]
fn while_and_for_loops_agree() {
    run_ok(
        r#"
        var total_while = 0;
        var i = 0;
        while (i < 5) {
            total_while = total_while + i;
            i = i + 1;
        }
        var total_for = 0;
        for (var j = 0; j < 5; j = j + 1) {
            total_for = total_for + j;
        }
        assert total_while == total_for, "loop forms agree";
        "#,
    );
}

#[test]
fn undefined_variable_is_reported() {
    let sink = run_fail("print does_not_exist;");
    let rendered = sink.rendered();
    assert_eq!(rendered.len(), 1);
    assert!(rendered[0].contains("Undefined variable 'does_not_exist'"));
}

#[test]
fn assigning_an_undeclared_name_creates_it_at_globals() {
    run_ok(
        r#"
        function set_it() {
            created_elsewhere = 42;
        }
        set_it();
        assert created_elsewhere == 42, "implicit global";
        "#,
    );
}

#[test]
fn importing_a_module_defines_its_globals() {
    let dir = tempdir().unwrap();
    let module_path = dir.path().join("util.ms");
    fs::write(&module_path, "function double(n) { return n * 2; }\n").unwrap();

    let main_path = dir.path().join("main.ms");
    let main_source = format!(
        "import \"{}\";\nassert double(4) == 8.0, \"import visible\";\n",
        module_path.to_str().unwrap().replace('\\', "\\\\")
    );
    fs::write(&main_path, &main_source).unwrap();

    let mut interpreter = Interpreter::new(Box::new(CollectingSink::new()));
    let source = fs::read_to_string(&main_path).unwrap();
    assert!(interpreter.run(&source, Some(main_path)));
}

#[test]
fn import_cycle_is_detected() {
    let dir = tempdir().unwrap();
    let a_path = dir.path().join("a.ms");
    let b_path = dir.path().join("b.ms");
    fs::write(&a_path, format!("import \"{}\";\n", b_path.display())).unwrap();
    fs::write(&b_path, format!("import \"{}\";\n", a_path.display())).unwrap();

    let mut interpreter = Interpreter::new(Box::new(CollectingSink::new()));
    let source = fs::read_to_string(&a_path).unwrap();
    assert!(!interpreter.run(&source, Some(a_path)));
}

#[test]
fn logical_operators_short_circuit_and_yield_booleans() {
    run_ok(
        r#"
        var calls = 0;
        function record() {
            calls = calls + 1;
            return true;
        }
        var result = false && record();
        assert calls == 0, "and short-circuits";
        assert result == false, "and yields boolean";
        result = true || record();
        assert calls == 0, "or short-circuits";
        assert result == true, "or yields boolean";
        "#,
    );
}

#[test]
fn print_arithmetic_widened_to_float_displays_without_decimal() {
    assert_eq!(printed_lines("print 1 + 2 * 3;"), vec!["7"]);
}

#[test]
fn print_string_plus_number_concatenates() {
    assert_eq!(printed_lines(r#"var s = "a" + 1; print s;"#), vec!["a1"]);
}

#[test]
fn print_function_call_result() {
    assert_eq!(
        printed_lines("function f(x){ return x*x; } print f(5);"),
        vec!["25"]
    );
}

#[test]
fn print_closure_counter_prints_three_lines() {
    let source = r#"
        function mk(){
            var i = 0;
            function inc(){ i = i + 1; return i; }
            return inc;
        }
        var c = mk();
        print c();
        print c();
        print c();
    "#;
    assert_eq!(printed_lines(source), vec!["1", "2", "3"]);
}

#[test]
fn print_list_index_assignment_sum() {
    let source = "var xs = [10,20,30]; xs[1] = 99; print xs[0] + xs[1] + xs[2];";
    assert_eq!(printed_lines(source), vec!["129"]);
}

#[test]
fn failed_assert_message_is_reported() {
    let sink = run_fail(r#"assert 2 + 2 == 5, "math broke";"#);
    let rendered = sink.rendered();
    assert_eq!(rendered.len(), 1);
    assert!(rendered[0].contains("Assertion failed: math broke"));
}
