//! services/app/src/stores/guard.rs
//!
//! The route guard: a pure decision over the current session snapshot.
//! Subscribers re-run it on every session transition, so a logout while a
//! protected view is open redirects immediately.

use polaris_core::domain::Route;

use crate::stores::session::SessionSnapshot;

/// What the router should do with a navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Session restoration is still in progress: render nothing and make
    /// no redirect decision yet.
    Pending,
    /// Unauthenticated access to a protected view. The attempted target is
    /// discarded; there is no return-to deep link.
    RedirectToLogin,
    /// Render the requested view.
    Render,
}

pub fn decide(session: &SessionSnapshot, route: Route) -> RouteDecision {
    if !route.is_protected() {
        return RouteDecision::Render;
    }
    match session {
        SessionSnapshot::Restoring => RouteDecision::Pending,
        SessionSnapshot::SignedOut => RouteDecision::RedirectToLogin,
        SessionSnapshot::SignedIn(_) => RouteDecision::Render,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polaris_core::domain::User;

    fn signed_in() -> SessionSnapshot {
        SessionSnapshot::SignedIn(User {
            email: "ada@example.com".to_string(),
        })
    }

    #[test]
    fn restoring_renders_nothing_and_redirects_nowhere() {
        assert_eq!(
            decide(&SessionSnapshot::Restoring, Route::Dashboard),
            RouteDecision::Pending
        );
        assert_eq!(
            decide(&SessionSnapshot::Restoring, Route::Profile),
            RouteDecision::Pending
        );
    }

    #[test]
    fn unauthenticated_protected_access_redirects_to_login() {
        assert_eq!(
            decide(&SessionSnapshot::SignedOut, Route::Dashboard),
            RouteDecision::RedirectToLogin
        );
        assert_eq!(
            decide(&SessionSnapshot::SignedOut, Route::Profile),
            RouteDecision::RedirectToLogin
        );
    }

    #[test]
    fn public_views_render_regardless_of_session() {
        for route in [Route::Landing, Route::Login, Route::Register] {
            assert_eq!(decide(&SessionSnapshot::Restoring, route), RouteDecision::Render);
            assert_eq!(decide(&SessionSnapshot::SignedOut, route), RouteDecision::Render);
            assert_eq!(decide(&signed_in(), route), RouteDecision::Render);
        }
    }

    #[test]
    fn authenticated_protected_access_renders() {
        assert_eq!(decide(&signed_in(), Route::Dashboard), RouteDecision::Render);
        assert_eq!(decide(&signed_in(), Route::Profile), RouteDecision::Render);
    }
}
