use assertables::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rstest::*;

use super::*;

/// Draw `n` consecutive inter-event times from a scheduler started at `t = 0`.
fn inter_event_times(scheduler: &mut Scheduler, n: usize, rng: &mut StdRng) -> Vec<f64> {
    let mut t = 0.0;
    let mut gaps = Vec::with_capacity(n);
    for _ in 0..n {
        let event = scheduler.next_event(t, &[], f64::INFINITY, rng).unwrap().unwrap();
        gaps.push(event.time - t);
        t = event.time;
    }
    gaps
}

#[rstest]
fn test_constant_rate_gaps_are_exponential() {
    let rate = 2.5;
    let n = 4000;
    let mut scheduler = Scheduler::new(RateSchedule::constant(vec![1.0, 1.5], 0.0, f64::INFINITY).unwrap());
    let mut rng = StdRng::seed_from_u64(17);

    let mut gaps = inter_event_times(&mut scheduler, n, &mut rng);
    gaps.sort_by(f64::total_cmp);

    // Kolmogorov-Smirnov distance to the exponential CDF
    #[allow(clippy::cast_precision_loss)]
    let count = n as f64;
    let distance = gaps
        .iter()
        .enumerate()
        .map(|(i, gap)| {
            let cdf = 1.0 - (-rate * gap).exp();
            #[allow(clippy::cast_precision_loss)]
            let (below, above) = (i as f64 / count, (i + 1) as f64 / count);
            (cdf - below).abs().max((above - cdf).abs())
        })
        .fold(0.0, f64::max);
    assert_lt!(distance, 1.95 / count.sqrt());
}

#[rstest]
fn test_channels_follow_rate_weights() {
    let mut scheduler = Scheduler::new(RateSchedule::constant(vec![1.0, 3.0], 0.0, f64::INFINITY).unwrap());
    let mut rng = StdRng::seed_from_u64(3);

    let mut t = 0.0;
    let mut counts = [0_usize; 2];
    for _ in 0..4000 {
        let event = scheduler.next_event(t, &[], f64::INFINITY, &mut rng).unwrap().unwrap();
        counts[event.channel] += 1;
        t = event.time;
    }

    #[allow(clippy::cast_precision_loss)]
    let share = counts[1] as f64 / 4000.0;
    assert_in_delta!(share, 0.75, 0.03);
}

#[rstest]
fn test_zero_rate_segment_consumes_no_randomness() {
    let delayed = RateSchedule::new(vec![0.0, 1.0], vec![vec![0.0], vec![1.0]], 10.0).unwrap();
    let immediate = RateSchedule::constant(vec![1.0], 1.0, 10.0).unwrap();

    for seed in 0..20 {
        let a = Scheduler::new(delayed.clone())
            .next_event(0.0, &[], 10.0, &mut StdRng::seed_from_u64(seed))
            .unwrap();
        let b = Scheduler::new(immediate.clone())
            .next_event(1.0, &[], 10.0, &mut StdRng::seed_from_u64(seed))
            .unwrap();
        assert_eq!(a, b, "seed {seed}");
    }
}

#[rstest]
fn test_hazard_carries_across_segments() {
    let schedule = RateSchedule::new(vec![0.0, 1.0], vec![vec![1.0], vec![2.0]], f64::INFINITY).unwrap();

    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut probe = rng.clone();
        let target: f64 = Exp1.sample(&mut probe);
        let expected = if target < 1.0 { target } else { 1.0 + (target - 1.0) / 2.0 };

        let event = Scheduler::new(schedule.clone())
            .next_event(0.0, &[], f64::INFINITY, &mut rng)
            .unwrap()
            .unwrap();
        assert_in_delta!(event.time, expected, 1e-12);
    }
}

#[rstest]
fn test_zero_total_rate_reports_no_event() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut untouched = rng.clone();

    let event = Scheduler::state_only(0.0).next_event(0.0, &[0.0, 0.0, 0.0], f64::INFINITY, &mut rng).unwrap();

    assert_eq!(event, None);
    assert_eq!(rng.gen::<u64>(), untouched.gen::<u64>());
}

#[rstest]
fn test_exhausted_schedule_reports_no_event() {
    let mut scheduler = Scheduler::new(RateSchedule::constant(vec![1.0], 0.0, 1.0).unwrap());
    let mut rng = StdRng::seed_from_u64(11);

    assert_eq!(scheduler.next_event(1.0, &[], f64::INFINITY, &mut rng).unwrap(), None);
    assert_eq!(scheduler.next_event(1.0 - 1e-12, &[], f64::INFINITY, &mut rng).unwrap(), None);
}

#[rstest]
fn test_bound_stops_the_search() {
    let mut scheduler = Scheduler::new(RateSchedule::constant(vec![1e-6], 0.0, f64::INFINITY).unwrap());
    let mut rng = StdRng::seed_from_u64(2);

    assert_eq!(scheduler.next_event(0.0, &[], 1e-3, &mut rng).unwrap(), None);
}

#[rstest]
fn test_repeating_schedule_replays_rates() {
    let schedule = RateSchedule::new(vec![0.0, 1.0], vec![vec![0.0], vec![5.0]], 2.0)
        .unwrap()
        .repeating(true)
        .unwrap();
    let mut scheduler = Scheduler::new(schedule);
    let mut rng = StdRng::seed_from_u64(8);

    let mut t = 0.0;
    let mut events = 0;
    while let Some(event) = scheduler.next_event(t, &[], 20.0, &mut rng).unwrap() {
        assert_ge!(event.time % 2.0, 1.0);
        t = event.time;
        events += 1;
    }
    assert_gt!(events, 0);
    assert_gt!(t, 10.0);
}

#[rstest]
#[case::state_channel(vec![1.0, 0.0], vec![0.0], 0)]
#[case::scheduled_channel(vec![0.0], vec![3.0], 1)]
fn test_state_channels_precede_scheduled_ones(
    #[case] state_rates: Vec<f64>,
    #[case] scheduled: Vec<f64>,
    #[case] expected: usize,
) {
    let mut scheduler = Scheduler::new(RateSchedule::constant(scheduled, 0.0, f64::INFINITY).unwrap());
    let mut rng = StdRng::seed_from_u64(1);

    for _ in 0..10 {
        let event = scheduler.next_event(0.0, &state_rates, f64::INFINITY, &mut rng).unwrap().unwrap();
        assert_eq!(event.channel, expected);
    }
}

#[rstest]
fn test_invalid_state_rates_are_invariant_violations() {
    let err = Scheduler::state_only(0.0)
        .next_event(0.0, &[1.0, -1.0], 1.0, &mut StdRng::seed_from_u64(0))
        .unwrap_err();
    assert!(err.is_invariant_violation());
}

#[rstest]
fn test_time_before_schedule_start() {
    let mut scheduler = Scheduler::new(RateSchedule::constant(vec![1.0], 1.0, 5.0).unwrap());
    let err = scheduler.next_event(0.5, &[], 5.0, &mut StdRng::seed_from_u64(0)).unwrap_err();
    assert!(matches!(err, TemporalNetworkError::Configuration(_)));
}

#[rstest]
#[case::no_breakpoints(vec![], vec![], 1.0)]
#[case::decreasing(vec![0.0, 2.0, 1.0], vec![vec![1.0]; 3], 5.0)]
#[case::horizon_before_last(vec![0.0, 2.0], vec![vec![1.0]; 2], 2.0)]
#[case::ragged(vec![0.0, 1.0], vec![vec![1.0], vec![1.0, 2.0]], 2.0)]
#[case::negative(vec![0.0], vec![vec![-0.5]], 1.0)]
#[case::nan(vec![0.0], vec![vec![f64::NAN]], 1.0)]
fn test_schedule_validation(#[case] times: Vec<f64>, #[case] rates: Vec<Vec<f64>>, #[case] horizon: f64) {
    let err = RateSchedule::new(times, rates, horizon).unwrap_err();
    assert!(matches!(err, TemporalNetworkError::Configuration(_)));
}

#[rstest]
fn test_unbounded_schedule_cannot_repeat() {
    let err = RateSchedule::empty(0.0).repeating(true).unwrap_err();
    assert!(matches!(err, TemporalNetworkError::Configuration(_)));
}

#[rstest]
fn test_rates_at() {
    let schedule = RateSchedule::new(vec![0.0, 1.0], vec![vec![1.0], vec![2.0]], 3.0).unwrap();

    assert_eq!(schedule.rates_at(0.5), Some(&[1.0][..]));
    assert_eq!(schedule.rates_at(1.0), Some(&[2.0][..]));
    assert_eq!(schedule.rates_at(3.0), None);
    assert_eq!(schedule.clone().repeating(true).unwrap().rates_at(4.5), Some(&[2.0][..]));
}
