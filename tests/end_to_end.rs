//! End-to-end scenarios and boundary behaviors exercising several modules
//! together: a `Model` built from more than one propagator, solved with
//! `Search` or `Optimiser`, and checked against the resulting `Solution`.
//! Per-propagator unit behaviour lives in each propagator's own `#[cfg(test)]`
//! module; these tests check the modules wired together the way a caller
//! would use them.

use munchkin_fd::solver::branching::value_selection::{Min, ObjImproving, ValueOrderingHeuristic};
use munchkin_fd::solver::branching::variable_selection::{DomDeg, Impact};
use munchkin_fd::solver::domain::Domain;
use munchkin_fd::solver::model::Model;
use munchkin_fd::solver::optimisation::{Direction, Optimiser, OptimisationOutcome};
use munchkin_fd::solver::propagation::run_to_fixed_point;
use munchkin_fd::solver::propagators::reification::Relation;
use munchkin_fd::solver::search::{Search, SearchOutcome};
use munchkin_fd::solver::termination::Indefinite;

// --- Boundary behaviors -----------------------------------------------

#[test]
fn empty_model_solves_to_a_single_empty_solution() {
    let model = Model::new();
    let variable_heuristic = DomDeg;
    let value_heuristic = Min;
    let termination = Indefinite;
    let search = Search::new(&model, &variable_heuristic, &value_heuristic, &termination);

    let (outcome, _) = search.solve().unwrap();
    match outcome {
        SearchOutcome::Solution(solution) => assert_eq!(solution.iter().count(), 0),
        _ => panic!("expected a solution"),
    }
}

#[test]
fn singleton_only_model_solves_with_no_branching() {
    let mut model = Model::new();
    let a = model.new_variable_with_domain(Domain::from_values(5, [3]), None);
    let b = model.new_variable_with_domain(Domain::from_values(5, [4]), None);

    let variable_heuristic = DomDeg;
    let value_heuristic = Min;
    let termination = Indefinite;
    let search = Search::new(&model, &variable_heuristic, &value_heuristic, &termination);

    let (outcome, stats) = search.solve().unwrap();
    assert_eq!(stats.nodes_visited, 1);
    match outcome {
        SearchOutcome::Solution(solution) => {
            assert_eq!(solution.value_of(a), 3);
            assert_eq!(solution.value_of(b), 4);
        }
        _ => panic!("expected a solution"),
    }
}

#[test]
fn infeasible_root_returns_empty_with_no_error() {
    let mut model = Model::new();
    let a = model.new_variable(1, None);
    let b = model.new_variable(1, None);
    model.post_all_different(vec![a, b]).unwrap();

    let variable_heuristic = DomDeg;
    let value_heuristic = Min;
    let termination = Indefinite;
    let search = Search::new(&model, &variable_heuristic, &value_heuristic, &termination);

    let (solutions, _) = search.solve_all(10).unwrap();
    assert!(solutions.is_empty());

    let (outcome, _) = search.solve().unwrap();
    assert!(matches!(outcome, SearchOutcome::Infeasible));
}

#[test]
fn unbounded_optimization_reaches_the_tightest_value_in_domain() {
    // x + y == sum, x,y in {1..5}: minimum reachable sum is 2, independent
    // of any upper limit on the search itself.
    let mut model = Model::new();
    let x = model.new_variable(5, None);
    let y = model.new_variable(5, None);
    let sum = model.new_variable(10, None);
    model.post_linear_sum(vec![x, y], vec![1, 1], sum).unwrap();

    let variable_heuristic = DomDeg;
    let value_heuristic = Min;
    let termination = Indefinite;
    let optimiser = Optimiser::new(&model, sum, Direction::Minimize, &variable_heuristic, &value_heuristic, &termination);

    let (outcome, _) = optimiser.solve().unwrap();
    match outcome {
        OptimisationOutcome::Optimal(solution) => assert_eq!(solution.value_of(sum), 2),
        _ => panic!("expected an optimal solution"),
    }
}

// --- Round-trip laws ----------------------------------------------------

#[test]
fn boolean_reification_round_trips_with_the_underlying_relation() {
    let mut model = Model::new();
    let b = model.new_bool_variable(None);
    let x = model.new_variable_with_domain(Domain::from_values(10, [3]), None);
    let y = model.new_variable_with_domain(Domain::from_values(10, [3]), None);
    model.post_reification(b, x, Relation::Equal, y).unwrap();

    let result = run_to_fixed_point(&model, model.root_state()).unwrap();
    // x == y always holds here, so b must be forced to true (2).
    assert_eq!(result.get_domain(b).singleton_value(), Some(2));
}

#[test]
fn count_encoding_round_trips_through_enumeration() {
    let mut model = Model::new();
    let a = model.new_variable_with_domain(Domain::from_values(3, [2]), None);
    let b = model.new_variable_with_domain(Domain::from_values(3, [2]), None);
    let c = model.new_variable_with_domain(Domain::from_values(3, [1]), None);
    let count_var = model.new_variable(4, None);
    model.post_count(vec![a, b, c], 2, count_var).unwrap();

    let result = run_to_fixed_point(&model, model.root_state()).unwrap();
    // exactly two of [a, b, c] equal 2, so count_var - 1 must equal 2.
    assert_eq!(result.get_domain(count_var).singleton_value(), Some(3));
}

// --- Scenario 1: BinPacking pruning -------------------------------------

#[test]
fn scenario_bin_packing_pruning() {
    let mut model = Model::new();
    let x1 = model.new_variable_with_domain(Domain::from_values(2, [1, 2]), None);
    let x2 = model.new_variable_with_domain(Domain::from_values(2, [1, 2]), None);
    let x3 = model.new_variable_with_domain(Domain::from_values(2, [1, 2]), None);
    model
        .post_bin_packing(vec![x1, x2, x3], vec![2, 2, 1], vec![4, 1])
        .unwrap();

    let result = run_to_fixed_point(&model, model.root_state()).unwrap();
    assert_eq!(result.get_domain(x1).singleton_value(), Some(1));
    assert_eq!(result.get_domain(x2).singleton_value(), Some(1));
    assert_eq!(result.get_domain(x3).singleton_value(), Some(2));
}

// --- Scenario 2: Count distribution --------------------------------------

#[test]
fn scenario_count_distribution() {
    let mut model = Model::new();
    let a = model.new_variable(3, None);
    let b = model.new_variable(3, None);
    let c = model.new_variable(3, None);
    let count_var = model.new_variable(4, None);
    model.post_count(vec![a, b, c], 2, count_var).unwrap();

    let variable_heuristic = DomDeg;
    let value_heuristic = Min;
    let termination = Indefinite;
    let search = Search::new(&model, &variable_heuristic, &value_heuristic, &termination);
    let (solutions, _) = search.solve_all(27).unwrap();
    assert_eq!(solutions.len(), 27);

    let mut buckets = [0u32; 4];
    for solution in &solutions {
        let count = solution.value_of(count_var) - 1;
        buckets[count as usize] += 1;
    }
    assert_eq!(buckets, [8, 12, 6, 1]);
}

// --- Scenario 3: Cumulative pruning --------------------------------------

#[test]
fn scenario_cumulative_pruning() {
    let mut model = Model::new();
    let a_start = model.new_variable_with_domain(Domain::from_values(4, [2]), None);
    let b_start = model.new_variable_with_domain(Domain::from_values(4, [1, 2, 3, 4]), None);
    model
        .post_cumulative(vec![a_start, b_start], vec![2, 2], vec![2, 1], 2)
        .unwrap();

    let result = run_to_fixed_point(&model, model.root_state()).unwrap();
    assert_eq!(result.get_domain(b_start).singleton_value(), Some(4));
}

// --- Scenario 4: NoOverlap -----------------------------------------------

#[test]
fn scenario_no_overlap() {
    let mut model = Model::new();
    let a_start = model.new_variable_with_domain(Domain::from_values(4, [2]), None);
    let b_start = model.new_variable_with_domain(Domain::from_values(4, [1, 2, 3, 4]), None);
    model.post_no_overlap(vec![a_start, b_start], vec![2, 2]).unwrap();

    let result = run_to_fixed_point(&model, model.root_state()).unwrap();
    assert_eq!(result.get_domain(b_start).singleton_value(), Some(4));
}

// --- Scenario 5: AllDifferent staircase ----------------------------------

#[test]
fn scenario_all_different_staircase_stays_unpruned() {
    let mut model = Model::new();
    let a = model.new_variable_with_domain(Domain::from_values(7, [1, 2, 3, 4]), None);
    let b = model.new_variable_with_domain(Domain::from_values(7, [2, 3, 4, 5]), None);
    let c = model.new_variable_with_domain(Domain::from_values(7, [3, 4, 5, 6]), None);
    let d = model.new_variable_with_domain(Domain::from_values(7, [4, 5, 6, 7]), None);
    model.post_all_different(vec![a, b, c, d]).unwrap();

    let result = run_to_fixed_point(&model, model.root_state()).unwrap();
    for v in [a, b, c, d] {
        assert_eq!(result.get_domain(v).count(), 4);
    }
}

// --- Scenario 6: LinearSum optimization -----------------------------------

#[test]
fn scenario_linear_sum_optimization() {
    let mut model = Model::new();
    let x = model.new_variable(3, None);
    let y = model.new_variable(3, None);
    let t = model.new_variable(9, None);
    model.post_linear_sum(vec![x, y], vec![1, 2], t).unwrap();

    let variable_heuristic = DomDeg;
    let value_heuristic = Min;
    let termination = Indefinite;
    let optimiser = Optimiser::new(&model, t, Direction::Minimize, &variable_heuristic, &value_heuristic, &termination);

    let (outcome, _) = optimiser.solve().unwrap();
    match outcome {
        OptimisationOutcome::Optimal(solution) => {
            assert_eq!(solution.value_of(t), 3);
            assert_eq!(solution.value_of(x), 1);
            assert_eq!(solution.value_of(y), 1);
        }
        _ => panic!("expected an optimal solution"),
    }
}

// --- Scenario 7: Element with constrained result --------------------------

#[test]
fn scenario_element_with_constrained_result() {
    let mut model = Model::new();
    let index = model.new_variable(5, None);
    let a1 = model.new_variable_with_domain(Domain::from_values(9, [2]), None);
    let a2 = model.new_variable_with_domain(Domain::from_values(9, [4]), None);
    let a3 = model.new_variable_with_domain(Domain::from_values(9, [4]), None);
    let a4 = model.new_variable_with_domain(Domain::from_values(9, [7]), None);
    let a5 = model.new_variable_with_domain(Domain::from_values(9, [9]), None);
    let result = model.new_variable_with_domain(Domain::from_values(9, [4, 7]), None);
    model.post_element(index, vec![a1, a2, a3, a4, a5], result).unwrap();

    let r = run_to_fixed_point(&model, model.root_state()).unwrap();
    assert_eq!(r.get_domain(index).values(), vec![2, 3, 4]);
    assert_eq!(r.get_domain(result).values(), vec![4, 7]);
}

// --- ObjImproving is actually wired into Optimiser -----------------------

#[test]
fn obj_improving_chases_the_incumbent_through_a_real_optimiser_run() {
    let _ = tracing_subscriber::fmt::try_init();

    let mut model = Model::new();
    let x = model.new_variable(5, None);
    let y = model.new_variable(5, None);
    let sum = model.new_variable(10, None);
    model.post_linear_sum(vec![x, y], vec![1, 1], sum).unwrap();

    let variable_heuristic = DomDeg;
    let value_heuristic = ObjImproving::new();
    let termination = Indefinite;
    let optimiser = Optimiser::new(&model, sum, Direction::Minimize, &variable_heuristic, &value_heuristic, &termination);

    assert_eq!(value_heuristic.current_target(), None);
    let (outcome, _) = optimiser.solve().unwrap();
    match outcome {
        OptimisationOutcome::Optimal(solution) => {
            assert_eq!(solution.value_of(sum), 2);
            // Optimiser::branch must have called on_incumbent at least once
            // for every improving solution it found, leaving the heuristic
            // chasing the final, optimal value.
            assert_eq!(value_heuristic.current_target(), Some(2));
        }
        _ => panic!("expected an optimal solution"),
    }

    // With a target set, ObjImproving orders values by distance to it
    // instead of ascending -- confirm the order actually changed.
    let state = model.root_state();
    let default_order = Min.order_values(&model, &state, x);
    let chasing_order = value_heuristic.order_values(&model, &state, x);
    assert_eq!(default_order, vec![1, 2, 3, 4, 5]);
    assert_eq!(chasing_order, vec![2, 1, 3, 4, 5]); // target 2: closest first, ties broken by ascending order
    assert_ne!(chasing_order, default_order);
}

// --- Impact accumulates real data through a real Search run --------------

#[test]
fn impact_accumulates_real_reductions_through_a_real_search_run() {
    let mut model = Model::new();
    let a = model.new_variable(3, None);
    let b = model.new_variable(3, None);
    model.post_all_different(vec![a, b]).unwrap();

    let variable_heuristic = Impact::new();
    let value_heuristic = Min;
    let termination = Indefinite;
    let search = Search::new(&model, &variable_heuristic, &value_heuristic, &termination);

    assert_eq!(variable_heuristic.impact_of(a), None);
    assert_eq!(variable_heuristic.impact_of(b), None);

    let (outcome, _) = search.solve().unwrap();
    assert!(matches!(outcome, SearchOutcome::Solution(_)));

    // Both variables get branched on in a 2-variable all-different model, so
    // Search::search's on_assignment calls must have populated both entries
    // instead of leaving Impact's map empty.
    let impact_a = variable_heuristic.impact_of(a).expect("a was branched on");
    let impact_b = variable_heuristic.impact_of(b).expect("b was branched on");

    // Whichever variable is branched on first shrinks the domain product from
    // 3*3=9 to 1*2=2 (reduction 7/9); the second shrinks 1*2=2 to 1*1=1
    // (reduction 1/2). Neither is the Impact::default() fallback of 1.0.
    let recorded = [impact_a, impact_b];
    assert!(recorded.iter().any(|&v| (v - 7.0 / 9.0).abs() < 1e-9));
    assert!(recorded.iter().any(|&v| (v - 0.5).abs() < 1e-9));
    assert!(recorded.iter().all(|&v| v != 1.0));
}
