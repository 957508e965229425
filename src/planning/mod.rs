//! The classical planning task model: variables, facts, operators and tasks,
//! together with the projection of a task onto a pattern.

mod projected_task;
pub use projected_task::ProjectedTask;

mod task;
pub use task::Effect;
pub use task::FactPair;
pub use task::Operator;
pub use task::Task;
