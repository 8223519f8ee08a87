//! Role-gated navigation rules.
//!
//! The routing table mirrors the web client: public pages, pages that
//! need any session, and farmer-only pages. `resolve` decides whether a
//! navigation attempt goes through or where it is redirected instead,
//! given the role of the current session (if any).

use crate::auth::Role;

/// Screens reachable in the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Signup,
    /// The buyer-facing marketplace catalog
    Market,
    /// Farmer-only: own listings and sales overview
    Dashboard,
    Checkout,
    Account,
    Logout,
    NotFound,
}

/// Who may enter a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Public,
    Authenticated,
    RoleOnly(Role),
}

/// Outcome of a navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Allow,
    Redirect(Route),
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Login => "/login",
            Route::Signup => "/signup",
            Route::Market => "/digital-market",
            Route::Dashboard => "/dashboard",
            Route::Checkout => "/checkout",
            Route::Account => "/account",
            Route::Logout => "/logout",
            Route::NotFound => "/404",
        }
    }

    fn access(&self) -> Access {
        match self {
            Route::Home | Route::Login | Route::Signup | Route::NotFound => Access::Public,
            Route::Market | Route::Checkout | Route::Account | Route::Logout => {
                Access::Authenticated
            }
            Route::Dashboard => Access::RoleOnly(Role::Farmer),
        }
    }

    /// Where a fresh login lands, by role.
    pub fn landing(role: Role) -> Route {
        match role {
            Role::Farmer => Route::Dashboard,
            Role::Buyer => Route::Market,
        }
    }
}

/// Decide a navigation attempt. `session_role` is `None` when no session
/// exists (anonymous).
pub fn resolve(route: Route, session_role: Option<Role>) -> Navigation {
    match route.access() {
        Access::Public => Navigation::Allow,
        Access::Authenticated => match session_role {
            Some(_) => Navigation::Allow,
            None => Navigation::Redirect(Route::Login),
        },
        Access::RoleOnly(required) => match session_role {
            Some(role) if role == required => Navigation::Allow,
            // Wrong role: send them to their own landing page
            Some(role) => Navigation::Redirect(Route::landing(role)),
            None => Navigation::Redirect(Route::Login),
        },
    }
}
