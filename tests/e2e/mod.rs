mod dashboard_flow;
mod session_flow;
