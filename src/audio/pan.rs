use std::f32::consts::FRAC_PI_2;

/// Pan position for a slow drift: `sin(elapsed * speed)`, always in [-1, 1].
pub fn drift_position(elapsed_secs: f32, speed: f32) -> f32 {
    (elapsed_secs * speed).sin()
}

/// Equal-power panning of a stereo signal. Moving left folds part of the
/// right channel into the left and vice versa; nothing is ever dropped.
#[inline]
pub fn pan_stereo((left, right): (f32, f32), pan: f32) -> (f32, f32) {
    let pan = pan.clamp(-1.0, 1.0);
    if pan <= 0.0 {
        let x = (pan + 1.0) * FRAC_PI_2;
        (left + right * x.cos(), right * x.sin())
    } else {
        let x = pan * FRAC_PI_2;
        (left * x.cos(), right + left * x.sin())
    }
}
