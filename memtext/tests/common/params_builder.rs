use memtext::{memcache::cli::parser::RuntimeType, memory_store::StoreEngine};

pub struct MemtextdServerParamsBuilder {
    engine: StoreEngine,
    runtime: RuntimeType,
    memory_limit: Option<String>,
    item_size_limit: Option<String>,
    connection_limit: u32,
    idle_timeout_secs: u64,
    threads: usize,
    port: u16,
}

#[allow(dead_code)]
impl MemtextdServerParamsBuilder {
    pub fn new() -> MemtextdServerParamsBuilder {
        MemtextdServerParamsBuilder {
            engine: StoreEngine::Buckets,
            runtime: RuntimeType::CurrentThread,
            memory_limit: None,
            item_size_limit: None,
            connection_limit: 0,
            idle_timeout_secs: 0,
            threads: 2,
            port: 11211,
        }
    }

    pub fn with_engine(&mut self, engine: StoreEngine) -> &mut Self {
        self.engine = engine;
        self
    }

    pub fn with_runtime(&mut self, runtime: RuntimeType) -> &mut Self {
        self.runtime = runtime;
        self
    }

    pub fn with_memory_limit(&mut self, memory_limit: &str) -> &mut Self {
        self.memory_limit = Some(String::from(memory_limit));
        self
    }

    pub fn with_item_size_limit(&mut self, item_size_limit: &str) -> &mut Self {
        self.item_size_limit = Some(String::from(item_size_limit));
        self
    }

    pub fn with_connection_limit(&mut self, connection_limit: u32) -> &mut Self {
        self.connection_limit = connection_limit;
        self
    }

    pub fn with_idle_timeout(&mut self, idle_timeout_secs: u64) -> &mut Self {
        self.idle_timeout_secs = idle_timeout_secs;
        self
    }

    pub fn with_threads(&mut self, threads: usize) -> &mut Self {
        self.threads = threads;
        self
    }

    pub fn with_port(&mut self, port: u16) -> &mut Self {
        self.port = port;
        self
    }

    pub fn build(&self) -> Vec<String> {
        let mut result: Vec<String> = vec![String::from("memtextd")];
        result.push(String::from("--store-engine"));
        match self.engine {
            StoreEngine::Buckets => result.push(String::from("buckets")),
            StoreEngine::DashMap => result.push(String::from("dash-map")),
        }

        result.push(String::from("--runtime-type"));
        match self.runtime {
            RuntimeType::CurrentThread => result.push(String::from("current-thread")),
            RuntimeType::MultiThread => result.push(String::from("multi-thread")),
        }

        if let Some(memory_limit) = &self.memory_limit {
            result.push(String::from("--memory-limit"));
            result.push(memory_limit.clone());
        }

        if let Some(item_size_limit) = &self.item_size_limit {
            result.push(String::from("--max-item-size"));
            result.push(item_size_limit.clone());
        }

        result.push(String::from("--connection-limit"));
        result.push(self.connection_limit.to_string());

        result.push(String::from("--idle-timeout"));
        result.push(self.idle_timeout_secs.to_string());

        result.push(String::from("--threads"));
        result.push(self.threads.to_string());

        result.push(String::from("--port"));
        result.push(self.port.to_string());

        result
    }
}
