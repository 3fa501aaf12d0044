pub mod user {
    pub mod schema;
    pub mod model;
    pub mod service;
    pub mod handle;
    pub mod route;
}

pub mod session {
    pub mod schema;
    pub mod service;
}

pub mod post {
    pub mod schema;
    pub mod model;
    pub mod service;
    pub mod handle;
    pub mod route;
}

pub mod relationship {
    pub mod schema;
    pub mod model;
    pub mod service;
    pub mod handle;
    pub mod route;
}

pub mod badge {
    pub mod schema;
    pub mod model;
    pub mod service;
    pub mod handle;
    pub mod route;
}

pub mod report {
    pub mod schema;
    pub mod model;
    pub mod service;
    pub mod handle;
    pub mod route;
}
