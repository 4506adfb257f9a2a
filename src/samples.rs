//! Sample fixtures written against the built-in conventions.
//!
//! These back the `stagehand samples` command and double as worked examples of the
//! fixture API: an NUnit-style fixture sharing one instance across its cases, and an
//! xUnit-style fixture that gets a fresh, releasable instance per case.

use std::sync::atomic::{AtomicUsize, Ordering};

use stagehand_core::markers::{FIXTURE_SET_UP, FIXTURE_TEAR_DOWN, SET_UP, TEAR_DOWN, TEST};

use crate::config::RunConfig;
use crate::convention::Convention;
use crate::pipeline::{Factory, Fixture, MethodResult, Release};
use crate::runner::{FixtureSuite, Suite};

/// Which sample fixtures to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style {
    #[default]
    All,
    Nunit,
    Xunit,
}

fn ensure(condition: bool, message: impl FnOnce() -> String) -> MethodResult {
    if condition { Ok(()) } else { Err(message().into()) }
}

// ============================================================================
// NUnit style
// ============================================================================

static CALCULATOR_SESSIONS: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug, Default)]
pub struct Calculator {
    total: i64,
}

impl Calculator {
    pub fn add(&mut self, value: i64) -> i64 {
        self.total += value;
        self.total
    }

    pub fn subtract(&mut self, value: i64) -> i64 {
        self.total -= value;
        self.total
    }

    pub fn divide(&mut self, value: i64) -> Result<i64, String> {
        if value == 0 {
            return Err("division by zero".to_string());
        }
        self.total /= value;
        Ok(self.total)
    }

    pub fn clear(&mut self) {
        self.total = 0;
    }
}

/// One instance serves every case; `set_up` clears the shared calculator.
#[derive(Debug, Default)]
pub struct CalculatorTests {
    calculator: Calculator,
    cases_run: usize,
}

pub fn calculator_fixture() -> Fixture<CalculatorTests> {
    Fixture::new("CalculatorTests")
        .static_method("open_session", [FIXTURE_SET_UP], || {
            CALCULATOR_SESSIONS.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .static_method("close_session", [FIXTURE_TEAR_DOWN], || {
            let open = CALCULATOR_SESSIONS.fetch_sub(1, Ordering::SeqCst);
            ensure(open > 0, || "closed a session that was never opened".to_string())
        })
        .method("clear", [SET_UP], |t: &mut CalculatorTests| {
            t.calculator.clear();
            Ok(())
        })
        .method("count", [TEAR_DOWN], |t: &mut CalculatorTests| {
            t.cases_run += 1;
            Ok(())
        })
        .method("adds", [TEST], |t: &mut CalculatorTests| {
            t.calculator.add(2);
            let total = t.calculator.add(3);
            ensure(total == 5, || format!("expected 5, got {total}"))
        })
        .method("subtracts", [TEST], |t: &mut CalculatorTests| {
            let total = t.calculator.subtract(4);
            ensure(total == -4, || format!("expected -4, got {total}"))
        })
        .method("rejects_division_by_zero", [TEST], |t: &mut CalculatorTests| {
            t.calculator.add(10);
            let result = t.calculator.divide(0);
            ensure(result.is_err(), || format!("expected an error, got {result:?}"))
        })
        .method("shares_instance", [TEST], |t: &mut CalculatorTests| {
            ensure(t.cases_run == 3, || format!("expected 3 earlier cases, saw {}", t.cases_run))
        })
}

// ============================================================================
// xUnit style
// ============================================================================

/// A fresh stack per case, seeded by `set_up` and released afterwards.
#[derive(Debug, Default)]
pub struct StackTests {
    items: Vec<u32>,
    open: bool,
}

impl Release for StackTests {
    fn release(&mut self) -> MethodResult {
        self.items.clear();
        ensure(self.open, || "stack was released twice".to_string())?;
        self.open = false;
        Ok(())
    }
}

pub fn stack_fixture() -> Fixture<StackTests> {
    Fixture::new("StackTests")
        .method("seed", [SET_UP], |t: &mut StackTests| {
            t.open = true;
            t.items.push(1);
            Ok(())
        })
        .method("check_open", [TEAR_DOWN], |t: &mut StackTests| {
            ensure(t.open, || "stack closed before tear-down".to_string())
        })
        .method("push_then_pop", [TEST], |t: &mut StackTests| {
            t.items.push(7);
            let top = t.items.pop();
            ensure(top == Some(7), || format!("expected Some(7), got {top:?}"))
        })
        .method("starts_from_seed", [TEST], |t: &mut StackTests| {
            ensure(t.items == [1], || format!("expected [1], got {:?}", t.items))
        })
        .method("pops_to_empty", [TEST], |t: &mut StackTests| {
            t.items.pop();
            let top = t.items.pop();
            ensure(top.is_none(), || format!("expected None, got {top:?}"))
        })
        .releasable()
}

/// Build the sample suites for `style`, honouring a lifecycle override in `config`.
pub fn suites(style: Style, config: &RunConfig) -> Vec<Box<dyn Suite>> {
    let convention = |convention: Convention| match config.lifecycle {
        Some(lifecycle) => convention.lifecycle(lifecycle),
        None => convention,
    };

    let mut suites: Vec<Box<dyn Suite>> = Vec::new();
    if matches!(style, Style::All | Style::Nunit) {
        suites.push(Box::new(FixtureSuite::from_convention(
            calculator_fixture(),
            &convention(Convention::nunit_style()),
            Factory::default_instance(),
        )));
    }
    if matches!(style, Style::All | Style::Xunit) {
        suites.push(Box::new(FixtureSuite::from_convention(
            stack_fixture(),
            &convention(Convention::xunit_style()),
            Factory::default_instance(),
        )));
    }
    suites
}
