//! Property-based invariants from the testable-properties list: domain
//! containment, propagator idempotence at the fixed point, monotone
//! shrinking, and confluence (propagator posting order does not change the
//! result). Random small models are generated with `proptest` rather than
//! hand-enumerated.

use proptest::collection::vec as pvec;
use proptest::prelude::*;

use munchkin_fd::solver::domain::Domain;
use munchkin_fd::solver::model::Model;
use munchkin_fd::solver::propagation::run_to_fixed_point;
use munchkin_fd::solver::propagators::inequality::Op;
use munchkin_fd::solver::variable::VariableId;

const UNIVERSE: u32 = 6;

fn subset_strategy() -> impl Strategy<Value = Vec<u32>> {
    pvec(1..=UNIVERSE, 1..=UNIVERSE as usize).prop_map(|mut values| {
        values.sort_unstable();
        values.dedup();
        values
    })
}

/// Builds a 3-variable model (initial domains from `subsets`) with
/// `AllDifferent` over all three plus `a < b`, mirroring a typical small CSP.
fn build_model(subsets: &[Vec<u32>; 3]) -> (Model, [VariableId; 3]) {
    let mut model = Model::new();
    let vars: [VariableId; 3] = [
        model.new_variable_with_domain(Domain::from_values(UNIVERSE, subsets[0].clone()), None),
        model.new_variable_with_domain(Domain::from_values(UNIVERSE, subsets[1].clone()), None),
        model.new_variable_with_domain(Domain::from_values(UNIVERSE, subsets[2].clone()), None),
    ];
    model.post_all_different(vars.to_vec()).unwrap();
    model.post_inequality(vars[0], Op::LessThan, vars[1]).unwrap();
    (model, vars)
}

proptest! {
    #[test]
    fn propagation_never_grows_a_domain_and_stays_within_the_initial_one(
        a in subset_strategy(), b in subset_strategy(), c in subset_strategy(),
    ) {
        let subsets = [a, b, c];
        let (model, vars) = build_model(&subsets);
        let Ok(result) = run_to_fixed_point(&model, model.root_state()) else {
            // A detected contradiction is a sound outcome, not a containment violation.
            return Ok(());
        };
        for (i, &v) in vars.iter().enumerate() {
            let after = result.get_domain(v);
            for value in after.values() {
                prop_assert!(subsets[i].contains(&value));
            }
            prop_assert!(after.count() <= subsets[i].len());
        }
    }

    #[test]
    fn propagators_are_idempotent_at_the_fixed_point(
        a in subset_strategy(), b in subset_strategy(), c in subset_strategy(),
    ) {
        let subsets = [a, b, c];
        let (model, vars) = build_model(&subsets);
        let Ok(once) = run_to_fixed_point(&model, model.root_state()) else { return Ok(()) };
        let twice = run_to_fixed_point(&model, once.clone()).unwrap();
        for &v in &vars {
            prop_assert!(once.get_domain(v).equal(&twice.get_domain(v)));
        }
    }

    #[test]
    fn propagation_to_a_fixed_point_only_ever_shrinks_domains(
        a in subset_strategy(), b in subset_strategy(), c in subset_strategy(),
    ) {
        let subsets = [a, b, c];
        let (model, vars) = build_model(&subsets);
        let Ok(result) = run_to_fixed_point(&model, model.root_state()) else { return Ok(()) };
        for (i, &v) in vars.iter().enumerate() {
            prop_assert!(result.get_domain(v).count() <= subsets[i].len());
        }
    }

    #[test]
    fn posting_order_does_not_change_the_fixed_point(
        a in subset_strategy(), b in subset_strategy(), c in subset_strategy(),
    ) {
        let subsets = [a, b, c];

        let mut forward = Model::new();
        let fvars: [VariableId; 3] = [
            forward.new_variable_with_domain(Domain::from_values(UNIVERSE, subsets[0].clone()), None),
            forward.new_variable_with_domain(Domain::from_values(UNIVERSE, subsets[1].clone()), None),
            forward.new_variable_with_domain(Domain::from_values(UNIVERSE, subsets[2].clone()), None),
        ];
        forward.post_all_different(fvars.to_vec()).unwrap();
        forward.post_inequality(fvars[0], Op::LessThan, fvars[1]).unwrap();

        let mut reverse = Model::new();
        let rvars: [VariableId; 3] = [
            reverse.new_variable_with_domain(Domain::from_values(UNIVERSE, subsets[0].clone()), None),
            reverse.new_variable_with_domain(Domain::from_values(UNIVERSE, subsets[1].clone()), None),
            reverse.new_variable_with_domain(Domain::from_values(UNIVERSE, subsets[2].clone()), None),
        ];
        reverse.post_inequality(rvars[0], Op::LessThan, rvars[1]).unwrap();
        reverse.post_all_different(rvars.to_vec()).unwrap();

        let forward_result = run_to_fixed_point(&forward, forward.root_state());
        let reverse_result = run_to_fixed_point(&reverse, reverse.root_state());

        match (forward_result, reverse_result) {
            (Ok(f), Ok(r)) => {
                for i in 0..3 {
                    prop_assert!(f.get_domain(fvars[i]).equal(&r.get_domain(rvars[i])));
                }
            }
            (Err(_), Err(_)) => {}
            _ => prop_assert!(false, "posting order changed feasibility"),
        }
    }
}
