//! Path-based access control over [`Session`]s.

use crate::domain::user::{Role, Session};

/// Path of the sign-in page.
pub const LOGIN_PATH: &str = "/login";

/// Path of the sign-up page.
pub const SIGNUP_PATH: &str = "/signup";

/// Path of the page explaining that access was denied.
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";

/// Paths requiring a [`Session`] regardless of configuration.
pub const DEFAULT_PROTECTED_PREFIXES: &[&str] = &[
    "/registry",
    "/coordinator",
    "/lecturer",
    "/profile",
    "/settings",
];

/// Paths only meaningful for anonymous visitors.
pub const AUTH_ONLY_PREFIXES: &[&str] = &[LOGIN_PATH, SIGNUP_PATH];

/// Outcome of evaluating a [`Policy`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Decision {
    /// Request may proceed to the page.
    Allow,

    /// Request must be redirected to the contained path.
    RedirectTo(&'static str),
}

/// Access policy deciding, per request, whether a [`Session`] may visit a
/// path.
///
/// Evaluation is a pure function of its inputs.
#[derive(Clone, Debug)]
pub struct Policy {
    /// Prefixes of paths requiring a [`Session`].
    protected: Vec<String>,
}

impl Default for Policy {
    fn default() -> Self {
        Self::new(Vec::<String>::new())
    }
}

impl Policy {
    /// Creates a new [`Policy`] protecting the provided prefixes on top of the
    /// [`DEFAULT_PROTECTED_PREFIXES`].
    #[must_use]
    pub fn new(protected: impl IntoIterator<Item = String>) -> Self {
        let mut prefixes: Vec<String> = DEFAULT_PROTECTED_PREFIXES
            .iter()
            .map(|&p| p.to_owned())
            .collect();
        for p in protected {
            let p = p.trim_end_matches('/').to_owned();
            if !p.is_empty() && !prefixes.contains(&p) {
                prefixes.push(p);
            }
        }
        Self {
            protected: prefixes,
        }
    }

    /// Returns the prefixes of paths requiring a [`Session`].
    #[must_use]
    pub fn protected_prefixes(&self) -> &[String] {
        &self.protected
    }

    /// Decides whether the provided `session` may visit the provided `path`.
    ///
    /// Rules are checked in order, the first matching one wins:
    /// 1. signed-in visitors of a sign-in/sign-up page go to their
    ///    [`Role::home()`];
    /// 2. anonymous visitors of a protected path go to [`LOGIN_PATH`];
    /// 3. signed-in visitors of another [`Role`]'s path go to
    ///    [`UNAUTHORIZED_PATH`], unless they are [`Role::Registry`], which may
    ///    visit any [`Role`]'s path;
    /// 4. everything else is allowed.
    #[must_use]
    pub fn evaluate(&self, session: Option<&Session>, path: &str) -> Decision {
        let is_auth_only = AUTH_ONLY_PREFIXES.iter().any(|p| has_prefix(path, p));
        let is_protected = self.protected.iter().any(|p| has_prefix(path, p));

        match session {
            Some(s) if is_auth_only => Decision::RedirectTo(s.role.home()),
            None if is_protected => Decision::RedirectTo(LOGIN_PATH),
            Some(s) => match required_role(path) {
                Some(required)
                    if required != s.role && s.role != Role::Registry =>
                {
                    Decision::RedirectTo(UNAUTHORIZED_PATH)
                }
                Some(_) | None => Decision::Allow,
            },
            None => Decision::Allow,
        }
    }
}

/// Returns the [`Role`] whose [`Role::path_prefix()`] the `path` lies under.
#[must_use]
pub fn required_role(path: &str) -> Option<Role> {
    Role::ALL.iter().copied().find(|role| {
        role.path_prefix()
            .is_some_and(|prefix| has_prefix(path, prefix))
    })
}

/// Checks whether the `path` equals `prefix` or lies under it.
///
/// Matching is per path segment: `/registry/claims` lies under `/registry`,
/// while `/registrymore` does not.
fn has_prefix(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

#[cfg(test)]
mod spec {
    use crate::domain::user::{self, Role, Session};

    use super::{
        required_role, Decision, Policy, DEFAULT_PROTECTED_PREFIXES,
        LOGIN_PATH, UNAUTHORIZED_PATH,
    };

    fn session(role: Role) -> Session {
        Session {
            user_id: user::Id::new(),
            email: user::Email::new("staff@unisa.ac.za").unwrap(),
            name: None,
            role,
        }
    }

    const ROLE_PATHS: &[(&str, Role)] = &[
        ("/registry", Role::Registry),
        ("/registry/claims/42", Role::Registry),
        ("/coordinator", Role::Coordinator),
        ("/coordinator/abc123", Role::Coordinator),
        ("/lecturer", Role::Lecturer),
        ("/lecturer/xyz/dashboard", Role::Lecturer),
    ];

    #[test]
    fn denies_foreign_role_paths_to_non_registry() {
        let policy = Policy::default();

        for &role in Role::ALL {
            if role == Role::Registry {
                continue;
            }
            for &(path, required) in ROLE_PATHS {
                let expected = if required == role {
                    Decision::Allow
                } else {
                    Decision::RedirectTo(UNAUTHORIZED_PATH)
                };
                assert_eq!(
                    policy.evaluate(Some(&session(role)), path),
                    expected,
                    "{role} visiting {path}",
                );
            }
        }
    }

    #[test]
    fn lets_registry_visit_every_role_path() {
        let policy = Policy::default();

        for &(path, _) in ROLE_PATHS {
            assert_eq!(
                policy.evaluate(Some(&session(Role::Registry)), path),
                Decision::Allow,
                "REGISTRY visiting {path}",
            );
        }
    }

    #[test]
    fn sends_signed_in_visitors_of_auth_pages_home() {
        let policy = Policy::default();

        for &role in Role::ALL {
            for path in ["/login", "/signup", "/login/", "/signup/step-2"] {
                assert_eq!(
                    policy.evaluate(Some(&session(role)), path),
                    Decision::RedirectTo(role.home()),
                    "{role} visiting {path}",
                );
            }
        }
    }

    #[test]
    fn sends_anonymous_visitors_of_protected_paths_to_login() {
        let policy = Policy::default();

        for prefix in DEFAULT_PROTECTED_PREFIXES {
            for path in [prefix.to_string(), format!("{prefix}/nested/page")] {
                assert_eq!(
                    policy.evaluate(None, &path),
                    Decision::RedirectTo(LOGIN_PATH),
                    "anonymous visiting {path}",
                );
            }
        }
    }

    #[test]
    fn lets_anyone_visit_public_paths() {
        let policy = Policy::default();

        for path in ["/", "/login", "/signup", "/unauthorized", "/about"] {
            assert_eq!(policy.evaluate(None, path), Decision::Allow, "{path}");
        }
        for &role in Role::ALL {
            for path in ["/", "/unauthorized", "/profile", "/settings"] {
                assert_eq!(
                    policy.evaluate(Some(&session(role)), path),
                    Decision::Allow,
                    "{role} visiting {path}",
                );
            }
        }
    }

    #[test]
    fn matches_whole_path_segments_only() {
        let policy = Policy::default();

        assert_eq!(policy.evaluate(None, "/registryx"), Decision::Allow);
        assert_eq!(policy.evaluate(None, "/loginx"), Decision::Allow);
        assert_eq!(
            policy.evaluate(Some(&session(Role::Lecturer)), "/coordinators"),
            Decision::Allow,
        );
        assert_eq!(required_role("/lecturers"), None);
    }

    #[test]
    fn protects_configured_prefixes() {
        let policy = Policy::new(["/claims/".to_owned(), "/profile".to_owned()]);

        assert_eq!(
            policy.evaluate(None, "/claims/7"),
            Decision::RedirectTo(LOGIN_PATH),
        );
        assert_eq!(
            policy.protected_prefixes().len(),
            DEFAULT_PROTECTED_PREFIXES.len() + 1,
        );
    }

    #[test]
    fn covers_documented_scenarios() {
        let policy = Policy::default();

        assert_eq!(
            policy.evaluate(Some(&session(Role::Coordinator)), "/registry"),
            Decision::RedirectTo(UNAUTHORIZED_PATH),
        );
        assert_eq!(
            policy.evaluate(
                Some(&session(Role::Registry)),
                "/coordinator/abc123",
            ),
            Decision::Allow,
        );
        assert_eq!(
            policy.evaluate(None, "/lecturer/xyz/dashboard"),
            Decision::RedirectTo(LOGIN_PATH),
        );
    }
}
