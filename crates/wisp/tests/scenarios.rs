use wisp::Interpreter;

fn run(source: &str) -> Result<String, wisp::Error> {
    let mut interpreter = Interpreter::new();
    let mut out = Vec::new();
    interpreter.run(source.as_bytes(), &mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

#[test]
fn constant_folded_arithmetic_prints_the_precomputed_sum() {
    assert_eq!(run("print(1 + 2 * 3);").unwrap(), "7\n");
}

#[test]
fn recursive_factorial() {
    let source = "
        fun factorial(n) {
            if (n <= 1) return 1;
            return n * factorial(n - 1);
        }
        print(factorial(6));
    ";
    assert_eq!(run(source).unwrap(), "720\n");
}

#[test]
fn array_elements_are_mutable_through_index_assignment() {
    let source = "
        var xs = [1, 2, 3];
        xs[0] = xs[0] + 100;
        print(xs);
    ";
    assert_eq!(run(source).unwrap(), "[ 101, 2, 3 ]\n");
}

#[test]
fn dict_entries_are_set_and_removed_by_assigning_null() {
    let source = r#"
        var d = {};
        d["name"] = "ouros";
        print(d["name"]);
        d["name"] = null;
        print(type(d["name"]));
    "#;
    assert_eq!(run(source).unwrap(), "ouros\nnull\n");
}

#[test]
fn a_closure_keeps_its_own_mutable_counter() {
    let source = "
        fun make_counter() {
            var count = 0;
            return fun() {
                count = count + 1;
                return count;
            };
        }
        var a = make_counter();
        var b = make_counter();
        print(a());
        print(a());
        print(b());
    ";
    assert_eq!(run(source).unwrap(), "1\n2\n1\n");
}

#[test]
fn while_loop_runs_until_break() {
    let source = "
        var i = 0;
        var sum = 0;
        while (true) {
            if (i >= 5) break;
            sum = sum + i;
            i = i + 1;
        }
        print(sum);
    ";
    assert_eq!(run(source).unwrap(), "10\n");
}

#[test]
fn blocks_introduce_their_own_scope() {
    let source = "
        var x = 1;
        {
            var x = 2;
            print(x);
        }
        print(x);
    ";
    assert_eq!(run(source).unwrap(), "2\n1\n");
}

#[test]
fn type_int_float_str_len_round_trip() {
    let source = r#"
        print(type(1));
        print(type(1.5));
        print(type("s"));
        print(type([1]));
        print(type({}));
        print(type(null));
        print(int("42"));
        print(float("2.5"));
        print(str(123));
        print(len("hello"));
        print(len([1, 2, 3]));
    "#;
    assert_eq!(
        run(source).unwrap(),
        "integer\nfloat\nstring\narray\ndict\nnull\n42\n2.5\n123\n5\n3\n"
    );
}

#[test]
fn array_aliasing_is_observed_across_bindings() {
    let source = "
        var a = [1, 2];
        var b = a;
        b[0] = 99;
        print(a);
    ";
    assert_eq!(run(source).unwrap(), "[ 99, 2 ]\n");
}

#[test]
fn calling_a_function_with_the_wrong_argument_count_is_a_runtime_error() {
    let source = "
        fun add(a, b) { return a + b; }
        add(1);
    ";
    assert!(run(source).is_err());
}

#[test]
fn dividing_by_zero_is_a_runtime_error_not_a_panic() {
    assert!(run("print(1 / 0);").is_err());
}

#[test]
fn referencing_an_undeclared_variable_is_a_runtime_error() {
    assert!(run("print(undeclared);").is_err());
}

#[test]
fn float_not_equals_matches_the_negation_of_equals_for_constants_and_at_runtime() {
    assert_eq!(run("print(1.0 != 2.0);").unwrap(), "true\n");
    assert_eq!(run("var a = 1.0; var b = 2.0; print(a != b);").unwrap(), "true\n");
}
