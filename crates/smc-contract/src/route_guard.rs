/// Trait contract for the surrounding route guard.
///
/// When `is_safe_to_leave` is false the controller performs no work for the
/// trigger and reports the blocked action name through `on_blocked`.
pub trait RouteGuard: Send + Sync {
    fn is_safe_to_leave(&self) -> bool;

    fn on_blocked(&self, _action: &str) {}
}

#[derive(Debug, Clone, Copy, Default)]
/// Guard that never blocks a transition.
pub struct OpenRouteGuard;

impl RouteGuard for OpenRouteGuard {
    fn is_safe_to_leave(&self) -> bool {
        true
    }
}
