//! Hierarchical model-view composition.
//!
//! [`TransformStack`] keeps the cumulative model-view matrix of the draw-call tree as a
//! stack of [`Mat4`]s. Each frame the stack is seeded with the camera's view matrix via
//! [`TransformStack::load_matrix`]; local transforms are then composed on top of it.
//!
//! # Multiplication order
//!
//! Matrices are column-major and act on column vectors. Every `mult_*` call
//! **right-multiplies** the top of the stack:
//!
//! ```text
//! top = top * local
//! ```
//!
//! so after `load_matrix(view)`, `mult_translation(t)`, `mult_scale(s)` the top is
//! `view * T * S`: vertices are scaled first, then translated, then moved into view space.
//! The transform written last in source order is the one applied first to the mesh.
//!
//! # Save / restore
//!
//! [`TransformStack::push_scope`] saves the current top and returns a [`StackScope`]
//! guard. Dropping the guard restores the saved matrix, so sibling subtrees cannot leak
//! their transforms into each other:
//!
//! ```
//! use solidview::{Mat4, TransformStack, Vec3};
//!
//! let mut stack = TransformStack::new();
//! stack.load_matrix(Mat4::IDENTITY);
//! {
//!     let mut floor = stack.push_scope().unwrap();
//!     floor.mult_scale(Vec3::new(3.0, 0.5, 3.0));
//! }
//! assert_eq!(stack.current_matrix(), Mat4::IDENTITY);
//! ```
//!
//! The raw [`push_matrix`](TransformStack::push_matrix) /
//! [`pop_matrix`](TransformStack::pop_matrix) pair is still available; popping the base
//! entry is reported as [`StackError::EmptyStackUnderflow`] instead of being ignored.

use glam::{Mat4, Vec3};
use thiserror::Error;

/// Misuse of a [`TransformStack`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StackError {
    /// `pop_matrix` was called while only the base entry remained.
    #[error("pop on a transform stack holding only its base entry")]
    EmptyStackUnderflow,
    /// `push_matrix` would exceed the configured depth limit.
    #[error("transform stack depth limit of {limit} exceeded")]
    StackOverflow { limit: usize },
}

/// A LIFO stack of model-view matrices. Never empty.
#[derive(Clone, Debug)]
pub struct TransformStack {
    entries: Vec<Mat4>,
    max_depth: Option<usize>,
}

impl Default for TransformStack {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformStack {
    /// Creates an unbounded stack holding a single identity entry.
    pub fn new() -> Self {
        Self {
            entries: vec![Mat4::IDENTITY],
            max_depth: None,
        }
    }

    /// Creates a stack that refuses to grow past `limit` entries (base included).
    ///
    /// A limit of zero is treated as one: the base entry always exists.
    pub fn with_depth_limit(limit: usize) -> Self {
        Self {
            entries: vec![Mat4::IDENTITY],
            max_depth: Some(limit.max(1)),
        }
    }

    /// Number of entries, including the base entry.
    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    /// Duplicates the top entry.
    pub fn push_matrix(&mut self) -> Result<(), StackError> {
        if let Some(limit) = self.max_depth {
            if self.entries.len() >= limit {
                return Err(StackError::StackOverflow { limit });
            }
        }
        let top = self.current_matrix();
        self.entries.push(top);
        Ok(())
    }

    /// Discards the top entry, exposing the one beneath.
    ///
    /// Fails without touching the stack when only the base entry remains.
    pub fn pop_matrix(&mut self) -> Result<(), StackError> {
        if self.entries.len() <= 1 {
            return Err(StackError::EmptyStackUnderflow);
        }
        self.entries.pop();
        Ok(())
    }

    /// Replaces the whole stack with a single base entry.
    pub fn load_matrix(&mut self, matrix: Mat4) {
        self.entries.clear();
        self.entries.push(matrix);
    }

    /// Right-multiplies the top entry by `matrix`.
    pub fn mult_matrix(&mut self, matrix: Mat4) {
        let top = self.top_mut();
        *top *= matrix;
    }

    pub fn mult_translation(&mut self, offset: impl Into<Vec3>) {
        self.mult_matrix(Mat4::from_translation(offset.into()));
    }

    pub fn mult_scale(&mut self, factors: impl Into<Vec3>) {
        self.mult_matrix(Mat4::from_scale(factors.into()));
    }

    /// Rotates about +X by `degrees` (right-hand rule).
    pub fn mult_rotation_x(&mut self, degrees: f32) {
        self.mult_matrix(Mat4::from_rotation_x(degrees.to_radians()));
    }

    /// Rotates about +Y by `degrees` (right-hand rule).
    pub fn mult_rotation_y(&mut self, degrees: f32) {
        self.mult_matrix(Mat4::from_rotation_y(degrees.to_radians()));
    }

    /// Rotates about +Z by `degrees` (right-hand rule).
    pub fn mult_rotation_z(&mut self, degrees: f32) {
        self.mult_matrix(Mat4::from_rotation_z(degrees.to_radians()));
    }

    /// The top entry, by value.
    pub fn current_matrix(&self) -> Mat4 {
        self.entries[self.entries.len() - 1]
    }

    /// Saves the current top and returns a guard that restores it when dropped.
    pub fn push_scope(&mut self) -> Result<StackScope<'_>, StackError> {
        let restore_depth = self.entries.len();
        self.push_matrix()?;
        Ok(StackScope {
            stack: self,
            restore_depth,
        })
    }

    /// Runs `f` inside a saved scope; the top is restored when `f` returns.
    pub fn scope<R>(&mut self, f: impl FnOnce(&mut StackScope<'_>) -> R) -> Result<R, StackError> {
        let mut scope = self.push_scope()?;
        Ok(f(&mut scope))
    }

    fn top_mut(&mut self) -> &mut Mat4 {
        let last = self.entries.len() - 1;
        &mut self.entries[last]
    }
}

/// A saved region of a [`TransformStack`].
///
/// Created by [`TransformStack::push_scope`]. Only composition, reads and nested scopes
/// are available while the guard is alive; the matrix that was on top when the scope was
/// opened is restored on drop, including on early returns through `?`.
#[derive(Debug)]
pub struct StackScope<'a> {
    stack: &'a mut TransformStack,
    restore_depth: usize,
}

impl StackScope<'_> {
    pub fn mult_matrix(&mut self, matrix: Mat4) {
        self.stack.mult_matrix(matrix);
    }

    pub fn mult_translation(&mut self, offset: impl Into<Vec3>) {
        self.stack.mult_translation(offset);
    }

    pub fn mult_scale(&mut self, factors: impl Into<Vec3>) {
        self.stack.mult_scale(factors);
    }

    pub fn mult_rotation_x(&mut self, degrees: f32) {
        self.stack.mult_rotation_x(degrees);
    }

    pub fn mult_rotation_y(&mut self, degrees: f32) {
        self.stack.mult_rotation_y(degrees);
    }

    pub fn mult_rotation_z(&mut self, degrees: f32) {
        self.stack.mult_rotation_z(degrees);
    }

    pub fn current_matrix(&self) -> Mat4 {
        self.stack.current_matrix()
    }

    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    /// Opens a nested scope.
    pub fn push_scope(&mut self) -> Result<StackScope<'_>, StackError> {
        self.stack.push_scope()
    }

    /// Runs `f` inside a nested scope.
    pub fn scope<R>(&mut self, f: impl FnOnce(&mut StackScope<'_>) -> R) -> Result<R, StackError> {
        self.stack.scope(f)
    }
}

impl Drop for StackScope<'_> {
    fn drop(&mut self) {
        self.stack.entries.truncate(self.restore_depth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    const EPS: f32 = 1e-6;

    fn sample_view() -> Mat4 {
        Mat4::look_at_rh(Vec3::new(3.0, 3.0, 3.0), Vec3::ZERO, Vec3::Y)
    }

    #[test]
    fn starts_with_single_identity_entry() {
        let stack = TransformStack::new();
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.current_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn balanced_push_pop_restores_top() {
        let mut stack = TransformStack::new();
        stack.load_matrix(sample_view());
        let before = stack.current_matrix();

        stack.push_matrix().unwrap();
        stack.push_matrix().unwrap();
        stack.pop_matrix().unwrap();
        stack.push_matrix().unwrap();
        stack.pop_matrix().unwrap();
        stack.pop_matrix().unwrap();

        assert_eq!(stack.current_matrix(), before);
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn pop_discards_composed_changes() {
        let mut stack = TransformStack::new();
        stack.load_matrix(sample_view());
        let before = stack.current_matrix();

        stack.push_matrix().unwrap();
        stack.mult_translation([1.0, 2.0, 3.0]);
        stack.mult_rotation_z(30.0);
        stack.push_matrix().unwrap();
        stack.mult_scale([2.0, 2.0, 2.0]);
        stack.pop_matrix().unwrap();
        stack.pop_matrix().unwrap();

        assert_eq!(stack.current_matrix(), before);
    }

    #[test]
    fn translation_inverse_round_trip() {
        let mut stack = TransformStack::new();
        stack.load_matrix(sample_view());
        let before = stack.current_matrix();

        stack.mult_translation([1.5, -2.0, 0.25]);
        stack.mult_translation([-1.5, 2.0, -0.25]);

        assert!(stack.current_matrix().abs_diff_eq(before, EPS));
    }

    #[test]
    fn unit_scale_and_zero_rotation_are_exact_no_ops() {
        let mut stack = TransformStack::new();
        stack.load_matrix(sample_view());
        let before = stack.current_matrix();

        stack.mult_scale([1.0, 1.0, 1.0]);
        assert_eq!(stack.current_matrix(), before);

        stack.mult_rotation_x(0.0);
        assert_eq!(stack.current_matrix(), before);
    }

    #[test]
    fn full_turn_about_y_is_identity() {
        let mut stack = TransformStack::new();
        stack.mult_rotation_y(360.0);
        assert!(stack.current_matrix().abs_diff_eq(Mat4::IDENTITY, EPS));
    }

    #[test]
    fn quarter_turn_about_y_maps_x_axis_to_negative_z() {
        let mut stack = TransformStack::new();
        stack.mult_rotation_y(90.0);

        let p = stack.current_matrix().transform_point3(Vec3::X);

        approx::assert_abs_diff_eq!(p.x, 0.0, epsilon = EPS);
        approx::assert_abs_diff_eq!(p.y, 0.0, epsilon = EPS);
        approx::assert_abs_diff_eq!(p.z, -1.0, epsilon = EPS);
    }

    #[test]
    fn quarter_turns_about_x_and_z_follow_right_hand_rule() {
        let mut stack = TransformStack::new();
        stack.mult_rotation_x(90.0);
        let p = stack.current_matrix().transform_point3(Vec3::Y);
        assert!(p.abs_diff_eq(Vec3::Z, EPS));

        stack.load_matrix(Mat4::IDENTITY);
        stack.mult_rotation_z(90.0);
        let p = stack.current_matrix().transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::Y, EPS));
    }

    #[test]
    fn pop_on_base_entry_fails_and_keeps_base() {
        let mut stack = TransformStack::new();
        let view = sample_view();
        stack.load_matrix(view);

        assert_eq!(stack.pop_matrix(), Err(StackError::EmptyStackUnderflow));
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.current_matrix(), view);
    }

    #[test]
    fn translate_inside_push_then_pop_restores_identity() {
        let mut stack = TransformStack::new();
        stack.load_matrix(Mat4::IDENTITY);
        stack.push_matrix().unwrap();
        stack.mult_translation([2.0, 0.0, 0.0]);
        let m1 = stack.current_matrix();
        stack.pop_matrix().unwrap();
        let m2 = stack.current_matrix();

        let origin = m1 * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!(origin.abs_diff_eq(Vec4::new(2.0, 0.0, 0.0, 1.0), EPS));
        assert_eq!(m2, Mat4::IDENTITY);
    }

    #[test]
    fn local_transforms_compose_on_the_right() {
        let mut stack = TransformStack::new();
        stack.mult_translation([0.0, 1.0, 0.0]);
        stack.mult_scale([2.0, 2.0, 2.0]);

        // Scale applies first, then translation.
        let p = stack.current_matrix().transform_point3(Vec3::new(1.0, 0.0, 0.0));
        assert!(p.abs_diff_eq(Vec3::new(2.0, 1.0, 0.0), EPS));
    }

    #[test]
    fn load_matrix_resets_depth() {
        let mut stack = TransformStack::new();
        stack.push_matrix().unwrap();
        stack.push_matrix().unwrap();
        stack.load_matrix(sample_view());
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.current_matrix(), sample_view());
    }

    #[test]
    fn depth_limit_reports_overflow_without_growing() {
        let mut stack = TransformStack::with_depth_limit(2);
        stack.push_matrix().unwrap();

        assert_eq!(
            stack.push_matrix(),
            Err(StackError::StackOverflow { limit: 2 })
        );
        assert_eq!(stack.depth(), 2);
    }

    #[test]
    fn scope_guard_restores_on_drop() {
        let mut stack = TransformStack::new();
        let view = sample_view();
        stack.load_matrix(view);

        {
            let mut scope = stack.push_scope().unwrap();
            scope.mult_translation([0.0, 5.0, 0.0]);
            {
                let mut inner = scope.push_scope().unwrap();
                inner.mult_rotation_y(45.0);
                assert_eq!(inner.depth(), 3);
            }
            assert_eq!(scope.depth(), 2);
            assert!(
                scope
                    .current_matrix()
                    .abs_diff_eq(view * Mat4::from_translation(Vec3::new(0.0, 5.0, 0.0)), EPS)
            );
        }

        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.current_matrix(), view);
    }

    #[test]
    fn scope_guard_restores_on_early_return() {
        fn draw_failing(stack: &mut TransformStack) -> Result<(), StackError> {
            let mut scope = stack.push_scope()?;
            scope.mult_scale([4.0, 4.0, 4.0]);
            Err(StackError::EmptyStackUnderflow)
        }

        let mut stack = TransformStack::new();
        assert!(draw_failing(&mut stack).is_err());
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.current_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn closure_scope_returns_value_and_restores() {
        let mut stack = TransformStack::new();
        let inside = stack
            .scope(|s| {
                s.mult_translation([2.0, 0.0, 0.0]);
                s.current_matrix()
            })
            .unwrap();

        assert!(
            inside
                .transform_point3(Vec3::ZERO)
                .abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), EPS)
        );
        assert_eq!(stack.current_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn scope_respects_depth_limit() {
        let mut stack = TransformStack::with_depth_limit(1);
        assert!(matches!(
            stack.push_scope(),
            Err(StackError::StackOverflow { limit: 1 })
        ));
        assert_eq!(stack.depth(), 1);
    }
}
