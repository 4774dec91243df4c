use glam::Vec2;

/// Semi-implicit Euler step: velocity first, then position with the new
/// velocity. Returns the tentative position.
pub fn integrate(position: Vec2, velocity: &mut Vec2, gravity: Vec2, delta: f32) -> Vec2 {
    *velocity += gravity * delta;
    position + *velocity * delta
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gravity_accelerates_then_moves() {
        let mut velocity = Vec2::new(10.0, 0.0);
        let next = integrate(Vec2::ZERO, &mut velocity, Vec2::new(0.0, 100.0), 0.5);
        assert_eq!(velocity, Vec2::new(10.0, 50.0));
        assert_eq!(next, Vec2::new(5.0, 25.0));
    }

    #[test]
    fn zero_delta_is_identity() {
        let mut velocity = Vec2::new(3.0, 4.0);
        let next = integrate(Vec2::ONE, &mut velocity, Vec2::new(0.0, 9.8), 0.0);
        assert_eq!(next, Vec2::ONE);
        assert_eq!(velocity, Vec2::new(3.0, 4.0));
    }
}
