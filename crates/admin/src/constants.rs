use std::fmt;

/// HTTP verbs the admin sends upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
    Patch,
    Delete,
}

impl RequestMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestMethod::Get => "GET",
            RequestMethod::Post => "POST",
            RequestMethod::Patch => "PATCH",
            RequestMethod::Delete => "DELETE",
        }
    }

    /// Key of the operation object under an OpenAPI path item.
    pub fn openapi_key(&self) -> &'static str {
        match self {
            RequestMethod::Get => "get",
            RequestMethod::Post => "post",
            RequestMethod::Patch => "patch",
            RequestMethod::Delete => "delete",
        }
    }
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl From<RequestMethod> for reqwest::Method {
    fn from(m: RequestMethod) -> Self {
        match m {
            RequestMethod::Get => reqwest::Method::GET,
            RequestMethod::Post => reqwest::Method::POST,
            RequestMethod::Patch => reqwest::Method::PATCH,
            RequestMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Which scaffolded form a view is building.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminFormType {
    Create,
    Update,
}

impl AdminFormType {
    pub fn suffix(&self) -> &'static str {
        match self {
            AdminFormType::Create => "CreateForm",
            AdminFormType::Update => "UpdateForm",
        }
    }

    /// Method of the upstream endpoint whose request body shapes the form.
    pub fn method(&self) -> RequestMethod {
        match self {
            AdminFormType::Create => RequestMethod::Post,
            AdminFormType::Update => RequestMethod::Patch,
        }
    }
}

/// Cookie holding the bearer token forwarded to private upstream APIs.
pub const TOKEN_COOKIE: &str = "token";

/// Keys tried in order when labelling a related object.
pub const RELATED_OBJECT_TITLE_KEYS: [&str; 4] = ["fullname", "full_name", "name", "title"];

pub const DEFAULT_PAGE_SIZE: u64 = 50;
pub const DEFAULT_PAGE_SIZE_OPTIONS: [u64; 3] = [5, 10, 50];
