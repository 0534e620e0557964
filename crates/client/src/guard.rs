//! Route guard: render-vs-redirect decisions for protected views.

use dayflow_common::models::{Role, Session};

use crate::session::LOGIN_ROUTE;

/// Outcome of a guarded navigation. Exactly one of: render the protected
/// view, or issue a single redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Render,
    Redirect(&'static str),
}

/// Decides whether a session may see a view requiring `required`.
///
/// Unauthenticated users go to the login route; authenticated users with
/// insufficient capability go to their own landing route, which itself
/// always passes the guard for their role, so a redirect never loops.
pub fn evaluate(session: Option<&Session>, required: Role) -> RouteDecision {
    let Some(session) = session else {
        return RouteDecision::Redirect(LOGIN_ROUTE);
    };

    if session.role.satisfies(required) {
        RouteDecision::Render
    } else {
        RouteDecision::Redirect(session.role.landing_route())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dayflow_common::models::User;

    fn session(role: Role) -> Session {
        Session {
            user: User {
                email: "ava@dayflow.dev".to_string(),
                name: "Ava".to_string(),
                role,
                employee_id: Some("EMP001".to_string()),
                manager_id: None,
                department: None,
                job_title: None,
                profile_picture: None,
            },
            role,
            token: "jwt-123".to_string(),
        }
    }

    #[test]
    fn unauthenticated_always_redirects_to_login() {
        for required in Role::all() {
            assert_eq!(
                evaluate(None, *required),
                RouteDecision::Redirect(LOGIN_ROUTE)
            );
        }
    }

    #[test]
    fn full_role_matrix() {
        use Role::*;
        let cases = [
            // (have, need, expected)
            (Employee, Employee, RouteDecision::Render),
            (Employee, Manager, RouteDecision::Redirect("/employee/dashboard")),
            (Employee, Admin, RouteDecision::Redirect("/employee/dashboard")),
            (Manager, Employee, RouteDecision::Render),
            (Manager, Manager, RouteDecision::Render),
            (Manager, Admin, RouteDecision::Redirect("/manager/dashboard")),
            (Admin, Employee, RouteDecision::Render),
            (Admin, Manager, RouteDecision::Render),
            (Admin, Admin, RouteDecision::Render),
        ];

        for (have, need, expected) in cases {
            assert_eq!(
                evaluate(Some(&session(have)), need),
                expected,
                "have={} need={}",
                have,
                need
            );
        }
    }

    #[test]
    fn landing_routes_never_loop() {
        // Each role's own landing route must render for that role, so a
        // mismatch redirect terminates after one hop.
        for role in Role::all() {
            assert_eq!(
                evaluate(Some(&session(*role)), *role),
                RouteDecision::Render
            );
        }
    }
}
