//! Integration tests for the animation module.

use cardmotion_core::animation::*;
use std::time::Duration;

const MS_16: Duration = Duration::from_millis(16);

fn drive<A: Animation>(anim: &mut A, max_frames: usize) -> usize {
    for frame in 0..max_frames {
        if anim.is_complete() {
            return frame;
        }
        anim.tick(MS_16);
    }
    max_frames
}

#[test]
fn spring_animator_settles_within_duration() {
    let mut animator =
        InterruptibleAnimator::new(Duration::from_millis(900), TimingCurve::spring(0.7));
    animator.start();
    let frames = drive(&mut animator, 1000);
    assert!(frames <= 57, "900ms at 16ms/frame should finish by frame 57, took {frames}");
    assert_eq!(animator.value(), 1.0);
}

#[test]
fn spring_animator_overshoots_mid_flight() {
    let mut animator =
        InterruptibleAnimator::new(Duration::from_millis(900), TimingCurve::spring(0.7));
    animator.start();
    let mut peak = 0.0_f64;
    while !animator.is_complete() {
        animator.tick(MS_16);
        peak = peak.max(animator.value());
    }
    assert!(peak > 1.0, "a 0.7 damping spring should bounce past the target: {peak}");
}

#[test]
fn scrub_then_reverse_returns_to_start() {
    let mut animator = InterruptibleAnimator::new(Duration::from_millis(250), TimingCurve::Linear);
    animator.pause();
    for fraction in [0.1, 0.4, 0.6] {
        animator.set_fraction_complete(fraction);
        assert_eq!(animator.fraction_complete(), fraction);
    }
    animator.set_reversed(true);
    animator.start();
    let mut completion = None;
    for _ in 0..100 {
        if let Some(position) = animator.advance(MS_16) {
            completion = Some(position);
            break;
        }
    }
    assert_eq!(completion, Some(AnimatingPosition::Start));
}

#[test]
fn easing_functions_are_monotonic() {
    for easing in [linear as EasingFn, ease_in, ease_out, ease_in_out] {
        let mut prev = 0.0f64;
        for i in 0..=100 {
            let t = f64::from(i) / 100.0;
            let v = easing(t);
            assert!(v >= prev - 1e-9, "easing should be monotonic at t={t}");
            prev = v;
        }
    }
}
