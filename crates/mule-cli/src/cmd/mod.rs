pub mod run_executable;
