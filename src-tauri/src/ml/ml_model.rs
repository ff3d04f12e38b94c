//! 機械学習モデルの共通定義
//!
//! 心疾患判定用の全結合ネットワークと関連する設定を提供します。

use burn::{
    config::Config,
    module::Module,
    nn::{Linear, LinearConfig, Relu},
    tensor::{backend::Backend, Int, Tensor},
};

/// クラス数（0 = 疾患なし, 1 = 疾患あり）
pub const NUM_CLASSES: usize = 2;

/// モデル設定
#[derive(Config, Debug)]
pub struct ModelConfig {
    /// 入力特徴量の数
    pub num_features: usize,
    /// 分類クラス数
    pub num_classes: usize,
    /// 隠れ層のユニット数
    #[config(default = 32)]
    pub hidden_size: usize,
}

impl ModelConfig {
    /// モデルを初期化
    pub fn init<B: Backend>(&self, device: &B::Device) -> HeartDiseaseMlp<B> {
        HeartDiseaseMlp {
            fc1: LinearConfig::new(self.num_features, self.hidden_size).init(device),
            fc2: LinearConfig::new(self.hidden_size, self.hidden_size).init(device),
            fc3: LinearConfig::new(self.hidden_size, self.num_classes).init(device),
            activation: Relu::new(),
        }
    }
}

/// 心疾患判定用MLP
///
/// # アーキテクチャ
/// - FC: num_features -> hidden + ReLU
/// - FC: hidden -> hidden + ReLU
/// - FC: hidden -> num_classes
/// - argmax (分類時)
#[derive(Module, Debug)]
pub struct HeartDiseaseMlp<B: Backend> {
    fc1: Linear<B>,
    fc2: Linear<B>,
    fc3: Linear<B>,
    activation: Relu,
}

impl<B: Backend> HeartDiseaseMlp<B> {
    /// 順伝播
    ///
    /// # 引数
    /// - `features`: 特徴量 [batch_size, num_features]
    ///
    /// # 戻り値
    /// - クラスごとのロジット [batch_size, num_classes]
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self.fc1.forward(features);
        let x = self.activation.forward(x);
        let x = self.fc2.forward(x);
        let x = self.activation.forward(x);
        self.fc3.forward(x)
    }

    /// 予測を実行
    ///
    /// # 戻り値
    /// - (予測クラスID [batch_size, 1], ロジット)
    pub fn predict(&self, features: Tensor<B, 2>) -> (Tensor<B, 2, Int>, Tensor<B, 2>) {
        let output = self.forward(features);
        let predictions = output.clone().argmax(1);
        (predictions, output)
    }
}
