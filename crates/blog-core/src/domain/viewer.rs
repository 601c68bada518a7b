/// Who is making the request, as far as visibility rules care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Viewer {
    #[default]
    Anonymous,
    Authenticated {
        user_id: i64,
    },
}

impl Viewer {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Viewer::Authenticated { .. })
    }
}
