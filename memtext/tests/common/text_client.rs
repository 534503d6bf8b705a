#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const READ_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, PartialEq, Eq)]
pub struct Value {
    pub key: String,
    pub flags: u32,
    pub data: Vec<u8>,
    /// Only sent in reply to `gets`
    pub cas: Option<u64>,
}

/// Minimal blocking client speaking the raw text protocol.
pub struct TextClient {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

impl TextClient {
    /// Retries until the server accepts connections.
    pub fn connect(addr: SocketAddr) -> TextClient {
        let started = Instant::now();
        loop {
            match TcpStream::connect(addr) {
                Ok(stream) => return TextClient::from_stream(stream),
                Err(_err) if started.elapsed() < CONNECT_TIMEOUT => {
                    thread::sleep(Duration::from_millis(20));
                }
                Err(err) => panic!("cannot connect to {}: {}", addr, err),
            }
        }
    }

    fn from_stream(stream: TcpStream) -> TextClient {
        stream.set_read_timeout(Some(READ_TIMEOUT)).unwrap();
        stream.set_nodelay(true).unwrap();
        let writer = stream.try_clone().unwrap();
        TextClient {
            reader: BufReader::new(stream),
            writer,
        }
    }

    pub fn set_read_timeout(&self, timeout: Duration) {
        self.writer.set_read_timeout(Some(timeout)).unwrap();
    }

    pub fn send(&mut self, data: &[u8]) {
        self.writer.write_all(data).unwrap();
    }

    /// Next response line without its CRLF.
    pub fn read_line(&mut self) -> String {
        self.try_read_line().unwrap()
    }

    pub fn try_read_line(&mut self) -> io::Result<String> {
        let mut line = Vec::new();
        let read = self.reader.read_until(b'\n', &mut line)?;
        if read == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "connection closed"));
        }
        assert!(line.ends_with(b"\r\n"), "line not terminated by CRLF: {:?}", line);
        line.truncate(line.len() - 2);
        Ok(String::from_utf8_lossy(&line).into_owned())
    }

    /// True once the server has closed the connection.
    pub fn is_closed(&mut self) -> bool {
        let mut buf = [0u8; 1];
        match self.reader.read(&mut buf) {
            Ok(0) => true,
            Ok(_) => false,
            Err(err) => matches!(
                err.kind(),
                io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted
            ),
        }
    }

    /// Sends a single line command and returns the first response line.
    pub fn command(&mut self, line: &str) -> String {
        self.send(format!("{}\r\n", line).as_bytes());
        self.read_line()
    }

    pub fn store(&mut self, verb: &str, key: &str, flags: u32, exptime: i64, data: &[u8]) -> String {
        let mut request = format!("{} {} {} {} {}\r\n", verb, key, flags, exptime, data.len()).into_bytes();
        request.extend_from_slice(data);
        request.extend_from_slice(b"\r\n");
        self.send(&request);
        self.read_line()
    }

    pub fn set(&mut self, key: &str, data: &[u8]) -> String {
        self.store("set", key, 0, 0, data)
    }

    /// Reads `VALUE` blocks up to `END`.
    pub fn read_values(&mut self) -> Vec<Value> {
        let mut values = Vec::new();
        loop {
            let line = self.read_line();
            if line == "END" {
                return values;
            }
            let parts: Vec<&str> = line.split(' ').collect();
            assert!(matches!(parts.len(), 4 | 5), "unexpected line: {}", line);
            assert_eq!(parts[0], "VALUE", "unexpected line: {}", line);
            let len: usize = parts[3].parse().unwrap();
            let mut data = vec![0u8; len + 2];
            self.reader.read_exact(&mut data).unwrap();
            assert_eq!(&data[len..], b"\r\n");
            data.truncate(len);
            values.push(Value {
                key: String::from(parts[1]),
                flags: parts[2].parse().unwrap(),
                data,
                cas: parts.get(4).map(|cas| cas.parse().unwrap()),
            });
        }
    }

    pub fn get_multi(&mut self, keys: &[&str]) -> Vec<Value> {
        self.send(format!("get {}\r\n", keys.join(" ")).as_bytes());
        self.read_values()
    }

    pub fn gets_multi(&mut self, keys: &[&str]) -> Vec<Value> {
        self.send(format!("gets {}\r\n", keys.join(" ")).as_bytes());
        self.read_values()
    }

    pub fn get(&mut self, key: &str) -> Option<Vec<u8>> {
        let mut values = self.get_multi(&[key]);
        assert!(values.len() <= 1);
        values.pop().map(|value| value.data)
    }

    pub fn stats(&mut self) -> HashMap<String, String> {
        self.send(b"stats\r\n");
        let mut stats = HashMap::new();
        loop {
            let line = self.read_line();
            if line == "END" {
                return stats;
            }
            let mut parts = line.splitn(3, ' ');
            assert_eq!(parts.next(), Some("STAT"), "unexpected line: {}", line);
            let name = parts.next().unwrap().to_string();
            let value = parts.next().unwrap_or("").to_string();
            stats.insert(name, value);
        }
    }

    pub fn stat(&mut self, name: &str) -> u64 {
        self.stats()[name].parse().unwrap()
    }
}
