use async_trait::async_trait;

/// StatusSink: 解析过程中加载状态文本的接收端
/// CLI 直接落到标准输出; 测试用捕获或静默实现
/// 失败穷尽时 (所有候选都不可用) 也通过它通知最终文案
pub trait StatusSink: Send + Sync {
    fn update(&self, text: &str);
}

/// 静默实现, 丢弃所有状态文本
#[cfg(test)]
pub struct NullSink;

#[cfg(test)]
impl StatusSink for NullSink {
    fn update(&self, _text: &str) {}
}

/// FileCheck: 下载动作前的文件存在性确认
/// 站点特有的状态码解读 (如某主机 403 也算存在) 必须留在实现内部,
/// 调用方只依赖 "存在/不存在" 的布尔语义
#[async_trait]
pub trait FileCheck: Send + Sync {
    async fn exists(&self, url: &str) -> bool;
}
