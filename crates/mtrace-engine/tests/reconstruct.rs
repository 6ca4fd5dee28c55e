use mtrace_engine::{StackScope, reconstruct, render_trace};
use mtrace_types::{COMPONENT_AUX_TRACE, COMPONENT_METHOD_TRACE, PointRow, PointType};

struct Rows {
    rows: Vec<PointRow>,
}

impl Rows {
    fn new() -> Self {
        Self { rows: Vec::new() }
    }

    fn push(mut self, thread_id: i64, kind: PointType, class: &str, method: &str, params: &str) -> Self {
        let marker = match kind {
            PointType::Entry => ">",
            PointType::Exit => "<",
            PointType::Event => "-",
        };
        let tp_id = self.rows.len() as i64 + 1;
        self.rows.push(PointRow {
            tp_id,
            component: COMPONENT_METHOD_TRACE.to_string(),
            formatted_parameters: format!("{}{}.{}{} bytecode method", marker, class, method, params),
            parameters: format!("{}||{}||{}", class, method, params),
            raw_time: 100 * tp_id,
            kind,
            thread_id,
        });
        self
    }

    fn entry(self, thread_id: i64, class: &str, method: &str, params: &str) -> Self {
        self.push(thread_id, PointType::Entry, class, method, params)
    }

    fn exit(self, thread_id: i64, class: &str, method: &str, params: &str) -> Self {
        self.push(thread_id, PointType::Exit, class, method, params)
    }

    fn exception_exit(mut self, thread_id: i64, class: &str, method: &str, params: &str) -> Self {
        self = self.exit(thread_id, class, method, params);
        let last = self.rows.last_mut().unwrap();
        last.formatted_parameters = format!("*{}.{}{} by exception", class, method, params);
        self
    }

    fn aux(mut self, thread_id: i64, text: &str) -> Self {
        let tp_id = self.rows.len() as i64 + 1;
        self.rows.push(PointRow {
            tp_id,
            component: COMPONENT_AUX_TRACE.to_string(),
            formatted_parameters: text.to_string(),
            parameters: String::new(),
            raw_time: 100 * tp_id,
            kind: PointType::Event,
            thread_id,
        });
        self
    }

    fn build(self) -> Vec<PointRow> {
        self.rows
    }
}

#[test]
fn test_nested_pair_levels() {
    let rows = Rows::new()
        .entry(1, "A", "foo", "(I)V")
        .entry(1, "B", "bar", "()V")
        .exit(1, "B", "bar", "()V")
        .exit(1, "A", "foo", "(I)V")
        .build();

    let invocations = reconstruct(rows, StackScope::PerThread);

    assert_eq!(invocations.len(), 2);
    assert_eq!(invocations[0].qualified_name(), "A.foo");
    assert_eq!(invocations[0].stack_level, 0);
    assert_eq!(invocations[0].exit_tp_id, Some(4));
    assert_eq!(invocations[0].duration(), Some(300));
    assert_eq!(invocations[1].qualified_name(), "B.bar");
    assert_eq!(invocations[1].stack_level, 1);
    assert_eq!(invocations[1].definition, "B.bar()V bytecode method");
    assert!(invocations.iter().all(|i| i.is_completed && !i.has_exception));
}

#[test]
fn test_unmatched_exit_leaves_output_unchanged() {
    let rows = Rows::new()
        .entry(1, "A", "foo", "()V")
        .exit(1, "Z", "zap", "()V")
        .build();

    let invocations = reconstruct(rows, StackScope::Global);

    assert_eq!(invocations.len(), 1);
    assert!(!invocations[0].is_completed);
    assert_eq!(invocations[0].time_out, None);
}

#[test]
fn test_perfect_nesting_reaches_depth_minus_one() {
    for depth in 1..=6usize {
        let mut rows = Rows::new();
        for level in 0..depth {
            rows = rows.entry(1, "C", &format!("m{}", level), "()V");
        }
        for level in (0..depth).rev() {
            rows = rows.exit(1, "C", &format!("m{}", level), "()V");
        }
        // A second top-level call after the first tree unwinds
        rows = rows.entry(1, "C", "m0", "()V").exit(1, "C", "m0", "()V");

        let invocations = reconstruct(rows.build(), StackScope::PerThread);

        assert_eq!(invocations.len(), depth + 1);
        assert!(invocations.iter().all(|i| i.is_completed));
        let max = invocations.iter().map(|i| i.stack_level).max().unwrap();
        assert_eq!(max, depth - 1);
        assert_eq!(invocations[depth].stack_level, 0);
    }
}

#[test]
fn test_recursive_calls_match_innermost_first() {
    let rows = Rows::new()
        .entry(1, "R", "walk", "(I)V")
        .entry(1, "R", "walk", "(I)V")
        .exit(1, "R", "walk", "(I)V")
        .exit(1, "R", "walk", "(I)V")
        .build();

    let invocations = reconstruct(rows, StackScope::PerThread);

    assert_eq!(invocations[0].exit_tp_id, Some(4));
    assert_eq!(invocations[1].exit_tp_id, Some(3));
}

#[test]
fn test_exception_exit_sets_flag() {
    let rows = Rows::new()
        .entry(1, "A", "foo", "()V")
        .entry(1, "B", "bar", "()V")
        .exception_exit(1, "B", "bar", "()V")
        .exit(1, "A", "foo", "()V")
        .build();

    let invocations = reconstruct(rows, StackScope::PerThread);

    assert!(!invocations[0].has_exception);
    assert!(invocations[1].has_exception);
    assert!(invocations[1].is_completed);
}

#[test]
fn test_aux_lines_attach_to_latest_invocation() {
    let rows = Rows::new()
        .aux(1, "dropped before any call")
        .entry(1, "A", "foo", "()V")
        .aux(1, "at A.foo")
        .entry(2, "B", "bar", "()V")
        .exit(2, "B", "bar", "()V")
        .aux(1, "at Main.main\\n(native)")
        .build();

    let invocations = reconstruct(rows, StackScope::PerThread);

    assert_eq!(invocations[0].aux_trace, vec!["at A.foo"]);
    // Attached to B.bar even though the line came from thread 1
    assert_eq!(invocations[1].aux_trace, vec!["at Main.main\n(native)"]);
}

#[test]
fn test_interleaved_threads_per_thread_scope() {
    let rows = Rows::new()
        .entry(1, "W", "run", "()V")
        .entry(2, "W", "run", "()V")
        .exit(1, "W", "run", "()V")
        .exit(2, "W", "run", "()V")
        .build();

    let invocations = reconstruct(rows, StackScope::PerThread);

    assert_eq!(invocations[0].thread_id, 1);
    assert_eq!(invocations[0].stack_level, 0);
    assert_eq!(invocations[0].exit_tp_id, Some(3));
    assert_eq!(invocations[1].thread_id, 2);
    assert_eq!(invocations[1].stack_level, 0);
    assert_eq!(invocations[1].exit_tp_id, Some(4));
}

#[test]
fn test_interleaved_threads_global_scope() {
    let rows = Rows::new()
        .entry(1, "W", "run", "()V")
        .entry(2, "W", "run", "()V")
        .exit(1, "W", "run", "()V")
        .exit(2, "W", "run", "()V")
        .build();

    let invocations = reconstruct(rows, StackScope::Global);

    // One shared counter: thread 2's entry nests under thread 1's
    assert_eq!(invocations[1].stack_level, 1);
    assert_eq!(invocations[1].exit_tp_id, Some(3));
    assert_eq!(invocations[0].exit_tp_id, Some(4));
}

#[test]
fn test_render_plain() {
    let rows = Rows::new()
        .entry(1, "A", "foo", "(I)V")
        .entry(1, "B", "bar", "()V")
        .exit(1, "B", "bar", "()V")
        .exit(1, "A", "foo", "(I)V")
        .build();

    let out = render_trace(rows, false);

    insta::assert_snapshot!(out, @r"
    >A.foo(I)V
    >B.bar()V
    <B.bar()V
    <A.foo(I)V
    ");
}

#[test]
fn test_render_indented_tracks_nesting() {
    let rows = Rows::new()
        .entry(1, "A", "foo", "(I)V")
        .entry(1, "B", "bar", "()V")
        .exit(1, "B", "bar", "()V")
        .exit(1, "A", "foo", "(I)V")
        .exit(1, "A", "foo", "(I)V")
        .entry(1, "C", "baz", "()V")
        .build();

    let out = render_trace(rows, true);

    let expected = [
        "    >A.foo(I)V",
        "        >B.bar()V",
        "        <B.bar()V",
        "    <A.foo(I)V",
        "<A.foo(I)V",
        "    >C.baz()V",
    ]
    .iter()
    .map(|line| format!("{}\n", line))
    .collect::<String>();
    assert_eq!(out, expected);
}

#[test]
fn test_render_skips_other_components() {
    let rows = Rows::new()
        .entry(1, "A", "foo", "()V")
        .aux(1, "stack text")
        .build();

    assert_eq!(render_trace(rows, false), ">A.foo()V\n");
}
