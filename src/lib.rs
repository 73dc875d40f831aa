//! Two-layer choice scheduling and assignment solver: a backtracking scheduler over slot
//! placement, layered under a min-cost-flow/MIP solver over chooser-to-choice assignment, tied
//! together by a parallel shotgun search with hill-climbing local refinement.

pub mod assignment;
pub mod assignment_solver;
pub mod cancel;
pub mod cli;
pub mod constraint;
pub mod constraints;
pub mod critical_set;
pub mod critical_set_analysis;
pub mod error;
pub mod hill_climbing;
pub mod ids;
pub mod implication_graph;
pub mod input_data;
pub mod io;
pub mod logging;
pub mod mip_flow;
pub mod mip_flow_static;
pub mod model;
pub mod options;
pub mod raw_input;
pub mod rng;
pub mod scheduling;
pub mod scheduling_solver;
pub mod scip_backend;
pub mod score;
pub mod shotgun;
pub mod solution;
pub mod union_find;

#[cfg(test)]
mod integration_tests {
    use crate::critical_set_analysis::CriticalSetAnalysis;
    use crate::ids::{ChoiceId, ChooserId, SlotId};
    use crate::input_data::InputDataBuilder;
    use crate::mip_flow_static::MipFlowStaticData;
    use crate::options::Options;
    use crate::raw_input::{RawChoice, RawChooser, RawInputData, RawSlot};
    use crate::scip_backend::ScipFlowSolver;
    use crate::score::Scoring;
    use crate::shotgun::ShotgunSolver;

    fn run(raw: RawInputData, options: Options) -> crate::solution::Solution {
        let input = InputDataBuilder::build(raw).unwrap();
        let analysis = if options.no_cs {
            CriticalSetAnalysis::disabled()
        } else {
            CriticalSetAnalysis::analyze(&input, !options.no_cs_simp)
        };
        let static_data = MipFlowStaticData::new(&input);
        let scoring = Scoring::new(&input, &options);
        let backend = ScipFlowSolver;
        let mut solver = ShotgunSolver::new(&input, &analysis, &static_data, &scoring, &options, &backend);
        let mut rng = crate::rng::thread_rng();
        let cancel = crate::cancel::CancelToken::new(Some(std::time::Instant::now() + std::time::Duration::from_secs(5)));
        solver.iterate(50, &mut rng, &cancel);
        solver.progress().best_solution.clone().expect("expected a feasible solution")
    }

    /// S1 - minimal: one slot, one choice, one chooser.
    #[test]
    fn s1_minimal() {
        let raw = RawInputData {
            choices: vec![RawChoice { name: "e".into(), min: 1, max: 1, parts: 1, optional: false }],
            choosers: vec![RawChooser { name: "p".into(), preferences: vec![1] }],
            slots: vec![RawSlot { name: "s".into() }],
            constraints: vec![],
        };
        let solution = run(raw, Options::default());
        let assignment = solution.assignment.unwrap();
        assert_eq!(assignment.choice_of(ChooserId(0), SlotId(0)), ChoiceId(0));
        assert_eq!(solution.scheduling.slot_of(ChoiceId(0)), SlotId(0));
    }

    /// S2 - single-slot sort: six choosers split across two equal-capacity choices by preference.
    #[test]
    fn s2_single_slot_sort() {
        let raw = RawInputData {
            choices: vec![
                RawChoice { name: "e1".into(), min: 3, max: 3, parts: 1, optional: false },
                RawChoice { name: "e2".into(), min: 3, max: 3, parts: 1, optional: false },
            ],
            choosers: vec![
                RawChooser { name: "p1".into(), preferences: vec![1, 0] },
                RawChooser { name: "p2".into(), preferences: vec![0, 1] },
                RawChooser { name: "p3".into(), preferences: vec![0, 1] },
                RawChooser { name: "p4".into(), preferences: vec![1, 0] },
                RawChooser { name: "p5".into(), preferences: vec![1, 0] },
                RawChooser { name: "p6".into(), preferences: vec![1, 1] },
            ],
            slots: vec![RawSlot { name: "s".into() }],
            constraints: vec![],
        };
        let solution = run(raw, Options::default());
        let assignment = solution.assignment.unwrap();
        let s = SlotId(0);
        let (e1, e2) = (ChoiceId(0), ChoiceId(1));
        assert_eq!(assignment.choice_of(ChooserId(0), s), e1);
        assert_eq!(assignment.choice_of(ChooserId(1), s), e2);
        assert_eq!(assignment.choice_of(ChooserId(2), s), e2);
        assert_eq!(assignment.choice_of(ChooserId(3), s), e1);
        assert_eq!(assignment.choice_of(ChooserId(4), s), e1);
        assert_eq!(assignment.choice_of(ChooserId(5), s), e2);
    }

    /// S3 - as S2, plus a constraint excluding p6 from e2; p6 must land in e1 instead.
    #[test]
    fn s3_constraint_blocks_one_choice() {
        use crate::constraint::RawConstraint;
        let raw = RawInputData {
            choices: vec![
                RawChoice { name: "e1".into(), min: 3, max: 3, parts: 1, optional: false },
                RawChoice { name: "e2".into(), min: 3, max: 3, parts: 1, optional: false },
            ],
            choosers: vec![
                RawChooser { name: "p1".into(), preferences: vec![1, 0] },
                RawChooser { name: "p2".into(), preferences: vec![0, 1] },
                RawChooser { name: "p3".into(), preferences: vec![0, 1] },
                RawChooser { name: "p4".into(), preferences: vec![1, 0] },
                RawChooser { name: "p5".into(), preferences: vec![1, 0] },
                RawChooser { name: "p6".into(), preferences: vec![1, 1] },
            ],
            slots: vec![RawSlot { name: "s".into() }],
            constraints: vec![RawConstraint::ChooserIsNotInChoice(ChooserId(5), ChoiceId(1))],
        };
        let solution = run(raw, Options::default());
        let assignment = solution.assignment.unwrap();
        assert_eq!(assignment.choice_of(ChooserId(5), SlotId(0)), ChoiceId(0));
    }

    /// S4 - multi-slot scheduling constraint pins e1 to s1; e2/e3 fall into s2.
    #[test]
    fn s4_multi_slot_with_scheduling_constraint() {
        use crate::constraint::RawConstraint;
        let raw = RawInputData {
            choices: vec![
                RawChoice { name: "e1".into(), min: 3, max: 3, parts: 1, optional: false },
                RawChoice { name: "e2".into(), min: 1, max: 3, parts: 1, optional: false },
                RawChoice { name: "e3".into(), min: 2, max: 3, parts: 1, optional: false },
            ],
            choosers: vec![
                RawChooser { name: "p1".into(), preferences: vec![1, 1, 0] },
                RawChooser { name: "p2".into(), preferences: vec![1, 0, 1] },
                RawChooser { name: "p3".into(), preferences: vec![1, 0, 1] },
            ],
            slots: vec![RawSlot { name: "s1".into() }, RawSlot { name: "s2".into() }],
            constraints: vec![RawConstraint::ChoiceIsInSlot(ChoiceId(0), SlotId(0))],
        };
        let solution = run(raw, Options::default());
        let (e1, e2, e3) = (ChoiceId(0), ChoiceId(1), ChoiceId(2));
        let (s1, s2) = (SlotId(0), SlotId(1));
        assert_eq!(solution.scheduling.slot_of(e1), s1);
        assert_eq!(solution.scheduling.slot_of(e2), s2);
        assert_eq!(solution.scheduling.slot_of(e3), s2);
        let assignment = solution.assignment.unwrap();
        assert_eq!(assignment.choice_of(ChooserId(0), s1), e1);
        assert_eq!(assignment.choice_of(ChooserId(1), s1), e1);
        assert_eq!(assignment.choice_of(ChooserId(2), s1), e1);
        assert_eq!(assignment.choice_of(ChooserId(0), s2), e2);
        assert_eq!(assignment.choice_of(ChooserId(1), s2), e3);
        assert_eq!(assignment.choice_of(ChooserId(2), s2), e3);
    }

    /// S5 - an optional choice with no demand is left unscheduled.
    #[test]
    fn s5_optional_choice_unscheduled_when_no_demand() {
        fn fixture() -> RawInputData {
            RawInputData {
                choices: vec![RawChoice { name: "w".into(), min: 1, max: 1, parts: 1, optional: true }],
                choosers: vec![RawChooser { name: "p".into(), preferences: vec![0] }],
                slots: vec![RawSlot { name: "s".into() }],
                constraints: vec![],
            }
        }
        let solution = run(fixture(), Options::default());
        let input = InputDataBuilder::build(fixture()).unwrap();
        let w = ChoiceId(0);
        assert!(input.slot(solution.scheduling.slot_of(w)).is_not_scheduled);
    }

    /// S6 - ChoicesHaveSameChoosers forces identical cohorts across the two linked choices.
    #[test]
    fn s6_linked_choices_force_identical_cohorts() {
        use crate::constraint::RawConstraint;
        let raw = RawInputData {
            choices: vec![
                RawChoice { name: "c1".into(), min: 2, max: 2, parts: 1, optional: false },
                RawChoice { name: "c2".into(), min: 2, max: 2, parts: 1, optional: false },
                RawChoice { name: "c3".into(), min: 2, max: 2, parts: 1, optional: false },
                RawChoice { name: "c4".into(), min: 2, max: 2, parts: 1, optional: false },
            ],
            choosers: vec![
                RawChooser { name: "p1".into(), preferences: vec![0, 2, 0, 2] },
                RawChooser { name: "p2".into(), preferences: vec![0, 2, 0, 2] },
                RawChooser { name: "p3".into(), preferences: vec![2, 0, 2, 0] },
                RawChooser { name: "p4".into(), preferences: vec![2, 0, 2, 0] },
            ],
            slots: vec![RawSlot { name: "s1".into() }, RawSlot { name: "s2".into() }],
            constraints: vec![RawConstraint::ChoicesHaveSameChoosers(ChoiceId(0), ChoiceId(3))],
        };
        let solution = run(raw, Options::default());
        let assignment = solution.assignment.unwrap();
        let c1_cohort = assignment.choosers_ordered(ChoiceId(0));
        let c4_cohort = assignment.choosers_ordered(ChoiceId(3));
        assert_eq!(c1_cohort, c4_cohort);
    }
}
