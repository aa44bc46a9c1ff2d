//! Cross-algorithm properties on the built-in environments.

use super::*;
use crate::environment::{
    Cell, CliffWalking, Environment, EnvironmentConfig, FrozenLake, GridWorld, StateSpace,
    TransitionModel,
};
use float_eq::assert_float_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Follows `policy` from the start state for at most `max_steps` steps.
///
/// Returns `(steps, total_reward, reached_terminal)`.
fn rollout<E: Environment>(env: &mut E, policy: &[usize], max_steps: usize) -> (usize, f64, bool) {
    let mut state = env.reset();
    let mut total = 0.0;
    for step_count in 1..=max_steps {
        let action = policy[env.state_to_idx(&state)];
        let step = env.step(action);
        total += step.reward;
        if step.done {
            return (step_count, total, true);
        }
        state = step.state;
    }
    (max_steps, total, false)
}

/// `Q(s, ·)` under `values`, straight from the model.
fn q_from_model<M: TransitionModel<State = Cell>>(model: &M, s: usize, values: &[f64], gamma: f64) -> Vec<f64> {
    let state = model.idx_to_state(s);
    (0..model.n_actions())
        .map(|a| {
            model
                .transitions(&state, a)
                .iter()
                .map(|t| {
                    let bootstrap = if t.terminal {
                        0.0
                    } else {
                        gamma * values[model.state_to_idx(&t.next_state)]
                    };
                    t.probability * (t.reward + bootstrap)
                })
                .sum()
        })
        .collect()
}

mod planners_on_open_grid {
    use super::*;

    const GAMMA: f64 = 0.99;
    const THETA: f64 = 1e-6;

    #[test]
    fn value_iteration_reaches_goal_in_eight_steps() {
        let mut env = GridWorld::default();
        let planned = value_iteration(&env, GAMMA, THETA);
        assert_eq!(rollout(&mut env, &planned.policy, 100), (8, 3.0, true));
    }

    #[test]
    fn policy_iteration_reaches_goal_in_eight_steps() {
        let mut env = GridWorld::default();
        let mut rng = StdRng::seed_from_u64(17);
        let planned = policy_iteration(&env, GAMMA, THETA, &mut rng);
        assert_eq!(rollout(&mut env, &planned.policy, 100), (8, 3.0, true));
    }

    #[test]
    fn both_planners_agree_on_optimal_actions() {
        let env = GridWorld::default();
        let vi = value_iteration(&env, GAMMA, THETA);
        let mut rng = StdRng::seed_from_u64(23);
        let pi = policy_iteration(&env, GAMMA, THETA, &mut rng);

        assert_float_eq!(pi.values, vi.values, abs_all <= 1e-4);
        for s in 0..env.n_states() {
            let q = q_from_model(&env, s, &vi.values, GAMMA);
            let best = q.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            assert!(q[pi.policy[s]] >= best - 1e-6, "state {s}");
            assert!(q[vi.policy[s]] >= best - 1e-6, "state {s}");
        }
    }

    #[test]
    fn policy_iteration_stabilizes_with_small_bellman_residual() {
        let env = GridWorld::default();
        let mut rng = StdRng::seed_from_u64(31);
        let planned = policy_iteration(&env, GAMMA, THETA, &mut rng);

        assert_eq!(greedy_policy(&env, &planned.values, GAMMA), planned.policy);
        for s in 0..env.n_states() {
            let q = q_from_model(&env, s, &planned.values, GAMMA);
            let best = q.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            assert!((planned.values[s] - best).abs() < THETA, "state {s}");
        }
    }

    #[test]
    fn walls_force_a_serpentine_detour() {
        // Column 1 is open only at the bottom and column 3 only at the top:
        // down 4, right 2, up 4, right 2, down 4.
        let walls = (0..4)
            .map(|row| Cell::new(row, 1))
            .chain((1..5).map(|row| Cell::new(row, 3)))
            .collect();
        let mut env = GridWorld::new(5, Cell::new(4, 4), walls).unwrap();
        let planned = value_iteration(&env, GAMMA, THETA);
        assert_eq!(rollout(&mut env, &planned.policy, 100), (16, -5.0, true));
    }
}

mod learners_on_open_grid {
    use super::*;

    #[test]
    fn q_learning_matches_the_planned_return() {
        let mut env = GridWorld::default();
        let params = AlgorithmParams {
            alpha: 0.1,
            epsilon: 0.1,
            n_episodes: 2000,
            ..AlgorithmParams::default()
        };
        let mut rng = StdRng::seed_from_u64(42);
        let learned = q_learning(&mut env, &params, &mut rng);
        assert_eq!(rollout(&mut env, &learned.policy, 100), (8, 3.0, true));
    }

    #[test]
    fn sarsa_matches_the_planned_return() {
        let mut env = GridWorld::default();
        let params = AlgorithmParams {
            alpha: 0.1,
            epsilon: 0.05,
            n_episodes: 2000,
            ..AlgorithmParams::default()
        };
        let mut rng = StdRng::seed_from_u64(42);
        let learned = sarsa(&mut env, &params, &mut rng);
        assert_eq!(rollout(&mut env, &learned.policy, 100), (8, 3.0, true));
    }

    #[test]
    fn q_learning_rewards_improve_over_training() {
        let mut env = GridWorld::default();
        let params = AlgorithmParams {
            n_episodes: 400,
            ..AlgorithmParams::default()
        };
        let mut rng = StdRng::seed_from_u64(7);
        let learned = q_learning(&mut env, &params, &mut rng);
        let early: f64 = learned.history[..50].iter().sum::<f64>() / 50.0;
        let late: f64 = learned.history[350..].iter().sum::<f64>() / 50.0;
        assert!(late > early, "early {early}, late {late}");
    }
}

mod shapes_on_every_environment {
    use super::*;

    #[test]
    fn policies_cover_every_state_with_valid_actions() {
        let params = AlgorithmParams {
            n_episodes: 10,
            ..AlgorithmParams::default()
        };
        for name in ["gridworld", "cliffwalking", "frozenlake"] {
            for algorithm in Algorithm::ALL {
                let mut env = EnvironmentConfig::named(name).unwrap().build(1).unwrap();
                let mut rng = StdRng::seed_from_u64(2);
                let result = run_algorithm(&mut env, algorithm, &params, &mut rng).unwrap();
                assert_eq!(result.policy.len(), env.n_states(), "{name} {algorithm}");
                assert!(
                    result.policy.iter().all(|&a| a < env.n_actions()),
                    "{name} {algorithm}"
                );
            }
        }
    }

    #[test]
    fn value_iteration_walks_the_cliff_edge() {
        let mut env = CliffWalking::new();
        let planned = value_iteration(&env, 0.99, 1e-6);
        // Up, eleven steps right, down.
        assert_eq!(rollout(&mut env, &planned.policy, 100), (13, -2.0, true));
    }

    #[test]
    fn frozen_lake_values_are_bounded_by_rewards() {
        let env = FrozenLake::new(true, 0);
        let planned = value_iteration(&env, 0.99, 1e-6);
        assert!(planned.values.iter().all(|v| (-10.0..=10.0).contains(v)));
        assert_eq!(planned.values[env.state_to_idx(&FrozenLake::GOAL)], 0.0);
    }
}

mod prediction_equivalence {
    use super::*;

    #[test]
    fn one_step_td_matches_td0_on_the_same_draws() {
        let params = AlgorithmParams {
            n_step: 1,
            n_episodes: 50,
            ..AlgorithmParams::default()
        };
        let policy = random_policy(16, 4, &mut StdRng::seed_from_u64(3));

        let mut a = FrozenLake::new(true, 99);
        let mut b = FrozenLake::new(true, 99);
        let td0 = td_prediction(&mut a, &policy, &params);
        let one_step = n_step_td(&mut b, &policy, &params);
        assert_eq!(td0.values, one_step.values);
        assert_eq!(td0.history, one_step.history);
    }
}
