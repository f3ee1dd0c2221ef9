//! Top-level routes of the client.

pub const APP_TITLE: &str = "My Places";
pub const HOME_GREETING: &str = "Welcome to the Home Page!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Places,
    Create,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Places => "/places",
            Route::Create => "/create",
        }
    }

    /// Label on the navigation bar.
    pub fn label(&self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::Places => "Places",
            Route::Create => "Create Place",
        }
    }

    /// Page heading.
    pub fn heading(&self) -> &'static str {
        match self {
            Route::Home => HOME_GREETING,
            Route::Places => "Places",
            Route::Create => "Create a New Place",
        }
    }

    /// Navigation bar order.
    pub const fn all() -> &'static [Route] {
        &[Route::Home, Route::Places, Route::Create]
    }

    /// Exact path match; anything else has no page.
    pub fn from_path(path: &str) -> Option<Route> {
        Route::all().iter().copied().find(|r| r.path() == path)
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
